use super::*;

fn ctx(base_url: &str) -> CliContext {
    CliContext { base_url: base_url.to_owned(), timeout: Duration::from_secs(5) }
}

#[test]
fn endpoint_joins_without_double_slash() {
    assert_eq!(ctx("http://localhost:3000/").endpoint("/api/generate"), "http://localhost:3000/api/generate");
    assert_eq!(ctx("http://localhost:3000").endpoint("/healthz"), "http://localhost:3000/healthz");
}

#[test]
fn parse_template_accepts_catalog_ids() {
    let template = parse_template("facebook-story").unwrap();
    assert_eq!((template.design_width, template.design_height), (1080, 1920));
}

#[test]
fn parse_template_rejects_unknown_ids() {
    let err = parse_template("billboard").unwrap_err();
    assert!(err.contains("billboard"));
    assert!(err.contains("google-display-banner"));
}

#[test]
fn output_path_defaults_to_template_and_extension() {
    let template = parse_template("google-display-square").unwrap();
    let png = DataUrl::new("image/png", vec![1]);
    assert_eq!(output_path(None, template, &png), PathBuf::from("google-display-square.png"));
    let jpeg = DataUrl::new("image/jpeg", vec![1]);
    assert_eq!(output_path(None, template, &jpeg), PathBuf::from("google-display-square.jpg"));
}

#[test]
fn output_path_prefers_explicit_file() {
    let template = parse_template("facebook-feed").unwrap();
    let data = DataUrl::new("image/png", vec![1]);
    assert_eq!(output_path(Some(PathBuf::from("out/bg.png")), template, &data), PathBuf::from("out/bg.png"));
}

#[test]
fn cli_parses_generate_arguments() {
    let cli = Cli::try_parse_from(["studio-cli", "generate", "--prompt", "beach at dawn", "--template", "facebook-story"])
        .unwrap();
    let Command::Generate(args) = cli.command else {
        panic!("expected generate");
    };
    assert_eq!(args.prompt, "beach at dawn");
    assert_eq!(args.template.id, "facebook-story");
    assert!(args.out.is_none());
}

#[test]
fn cli_defaults_to_feed_template() {
    let cli = Cli::try_parse_from(["studio-cli", "generate", "--prompt", "x"]).unwrap();
    let Command::Generate(args) = cli.command else {
        panic!("expected generate");
    };
    assert_eq!(args.template.id, "facebook-feed");
}
