use persona_relay::error::Error;
use persona_relay::persona::Persona;
use std::io::Write;

#[test]
fn persona_file_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[persona]
name = "Tea"
greeting = "Hi, I'm Tea."
system_prompt = "You are Tea. Answer in English."
"#
    )
    .unwrap();

    let persona = Persona::load(Some(file.path())).unwrap();

    assert_eq!(persona.name, "Tea");
    assert_eq!(persona.greeting, "Hi, I'm Tea.");
    assert_eq!(persona.system_prompt, "You are Tea. Answer in English.");
    assert_eq!(persona.memory_heading, Persona::default().memory_heading);
}

#[test]
fn missing_persona_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Persona::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, Error::Config(ref m) if m.contains("absent.toml")));
}

#[test]
fn no_path_means_default_persona() {
    let persona = Persona::load(None).unwrap();
    assert_eq!(persona, Persona::default());
}
