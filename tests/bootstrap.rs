use scamguard::AppContext;
use scamguard::config::Settings;

#[test]
fn build_wires_services_from_settings() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::defaults("test");
    settings.storage.data_dir = dir.path().join("data").display().to_string();
    settings.audit.channel_id = Some(1);

    let app = AppContext::build(settings).unwrap();
    assert!(app.antiscam.ledger().is_empty());
    assert!(app.shadowban.registry().is_empty());
    assert!(app.antiscam.classifier().classify("envoie moi 50€"));
}

#[test]
fn invalid_pattern_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::defaults("test");
    settings.storage.data_dir = dir.path().display().to_string();
    settings.antiscam.lexicon.patterns = vec!["(unclosed".into()];

    assert!(AppContext::build(settings).is_err());
}
