//! Verb pipelines
//!
//! Each verb composes the stages over the files named by a [Config]:
//!
//! - `parse`: header text → [Api] JSON
//! - `transform`: source [Api] (read, or parsed from the sources) → target [Api] JSON
//! - `generate`: target [Api] → one header per file, written under the base directory
//! - `update`: target [Api] → existing headers patched in place, missing ones generated
//!
//! JSON output goes to the configured output file, or stdout when it is `-` or missing.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::generate::generate_file;
use crate::model::{Api, ApiFile};
use crate::parser::parse_header;
use crate::transform::transform_api;
use crate::update::update_header;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Parse,
    Transform,
    Generate,
    Update,
}

impl Verb {
    pub const ALL: [Verb; 4] = [Verb::Parse, Verb::Transform, Verb::Generate, Verb::Update];

    pub fn name(&self) -> &'static str {
        match self {
            Verb::Parse => "parse",
            Verb::Transform => "transform",
            Verb::Generate => "generate",
            Verb::Update => "update",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|verb| verb.name() == name)
    }
}

/// Run `verb` to completion.
pub fn run(verb: Verb, config: &Config) -> Result<()> {
    let diagnostics = config.diagnostics();
    tracing::debug!(verb = verb.name(), "running");
    match verb {
        Verb::Parse => {
            let api = parse_sources(config, &diagnostics)?;
            write_output(config, &to_json(&api)?)?;
        }
        Verb::Transform => {
            let api = transform(config, &diagnostics)?;
            write_output(config, &to_json(&api)?)?;
        }
        Verb::Generate => {
            generate(config)?;
        }
        Verb::Update => {
            update(config, &diagnostics)?;
        }
    }
    if diagnostics.warning_count() > 0 {
        diagnostics.info(format!("{} warning(s)", diagnostics.warning_count()));
    }
    Ok(())
}

/// Parse every configured source header into one [Api].
pub fn parse_sources(config: &Config, diagnostics: &Diagnostics) -> Result<Api> {
    if config.sources.is_empty() {
        return Err(Error::Usage("no input files".to_string()));
    }
    let options = config.parse_options();
    let mut api = Api::new();
    for source in &config.sources {
        let path = config.resolve(source);
        let text = fs::read_to_string(&path).map_err(|err| Error::io(&path, err))?;
        let name = file_name(&path);
        diagnostics.info(format!("parsing {}", path.display()));
        api.insert(parse_header(&name, &text, config.parser, &options, diagnostics)?);
    }
    Ok(api)
}

/// The target [Api]: the source API (from `sourceApi`, or parsed from the sources) mapped
/// through the configured transform spec.
pub fn transform(config: &Config, diagnostics: &Diagnostics) -> Result<Api> {
    let source = match &config.source_api {
        Some(path) => read_api(&config.resolve(path))?,
        None => parse_sources(config, diagnostics)?,
    };
    let spec = config.transform_spec()?;
    transform_api(&source, &spec, diagnostics)
}

/// Write one header per target file under the base directory. Returns the written paths.
pub fn generate(config: &Config) -> Result<Vec<PathBuf>> {
    let api = target_api(config)?;
    let mut written = Vec::new();
    for file in selected_files(&api, config) {
        let path = config.resolve(&file.name);
        write_file(&path, &generate_file(file, &config.generate))?;
        written.push(path);
    }
    Ok(written)
}

/// Patch each existing target header in place, generating the ones that do not exist yet.
/// Returns the paths whose content changed.
pub fn update(config: &Config, diagnostics: &Diagnostics) -> Result<Vec<PathBuf>> {
    let api = target_api(config)?;
    let mut written = Vec::new();
    for file in selected_files(&api, config) {
        let path = config.resolve(&file.name);
        let text = if path.exists() {
            let existing = fs::read_to_string(&path).map_err(|err| Error::io(&path, err))?;
            let updated = update_header(&existing, file, config.parser, &config.generate, diagnostics)?;
            if updated == existing {
                tracing::debug!(path = %path.display(), "up to date");
                continue;
            }
            updated
        } else {
            generate_file(file, &config.generate)
        };
        write_file(&path, &text)?;
        written.push(path);
    }
    Ok(written)
}

pub fn read_api(path: &Path) -> Result<Api> {
    let text = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    Ok(serde_json::from_str(&text)?)
}

fn target_api(config: &Config) -> Result<Api> {
    match &config.api {
        Some(path) => read_api(&config.resolve(path)),
        None => Err(Error::Usage("no API file given".to_string())),
    }
}

/// All files of `api`, or only those named in the sources.
fn selected_files<'a>(api: &'a Api, config: &'a Config) -> impl Iterator<Item = &'a ApiFile> + 'a {
    api.files
        .values()
        .filter(move |file| config.sources.is_empty() || config.sources.iter().any(|name| name == &file.name))
}

fn to_json(api: &Api) -> Result<String> {
    let mut text = serde_json::to_string_pretty(api)?;
    text.push('\n');
    Ok(text)
}

fn write_output(config: &Config, text: &str) -> Result<()> {
    match config.output_file.as_deref() {
        None | Some("-") => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|err| Error::io("<stdout>", err))
        }
        Some(path) => write_file(&config.resolve(path), text),
    }
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
    }
    tracing::debug!(path = %path.display(), "writing");
    fs::write(path, text).map_err(|err| Error::io(path, err))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformSource;
    use crate::transform::TransformSpec;

    const INIT_H: &str = "\
/**
 * # CategoryInit
 */

/**
 * Initialize.
 */
extern SDL_DECLSPEC bool SDLCALL SDL_Init(SDL_InitFlags flags);

/**
 * Quit.
 */
extern SDL_DECLSPEC void SDLCALL SDL_Quit(void);
";

    fn config_in(dir: &Path) -> Config {
        Config {
            base_dir: Some(dir.to_path_buf()),
            silent: true,
            ..Config::default()
        }
    }

    #[test]
    fn test_verb_names() {
        for verb in Verb::ALL {
            assert_eq!(Verb::from_name(verb.name()), Some(verb));
        }
        assert_eq!(Verb::from_name("help"), None);
    }

    #[test]
    fn test_parse_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("SDL_init.h"), INIT_H).unwrap();
        let config = Config {
            sources: vec!["SDL_init.h".to_string()],
            ..config_in(dir.path())
        };
        let api = parse_sources(&config, &config.diagnostics()).unwrap();
        let file = &api.files["SDL_init.h"];
        assert_eq!(file.entries.keys().collect::<Vec<_>>(), vec!["SDL_Init", "SDL_Quit"]);
    }

    #[test]
    fn test_parse_without_sources_is_a_usage_error() {
        let config = Config::default();
        assert!(matches!(parse_sources(&config, &Diagnostics::silent()), Err(Error::Usage(_))));
    }

    #[test]
    fn test_missing_source_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            sources: vec!["SDL_missing.h".to_string()],
            ..config_in(dir.path())
        };
        assert!(matches!(parse_sources(&config, &Diagnostics::silent()), Err(Error::Io { .. })));
    }

    #[test]
    fn test_transform_generate_and_update() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("SDL_init.h"), INIT_H).unwrap();
        let spec: TransformSpec =
            serde_json::from_str(r#"{"files": {"SDL3pp_init.h": {"source": "SDL_init.h"}}}"#).unwrap();
        let config = Config {
            sources: vec!["SDL_init.h".to_string()],
            transform: Some(TransformSource::Inline(spec)),
            ..config_in(dir.path())
        };
        let target = transform(&config, &config.diagnostics()).unwrap();
        assert_eq!(target.files["SDL3pp_init.h"].entries.keys().collect::<Vec<_>>(), vec!["Init", "Quit"]);

        let api_path = dir.path().join("target.json");
        fs::write(&api_path, to_json(&target).unwrap()).unwrap();
        let config = Config {
            api: Some(api_path),
            ..config_in(dir.path())
        };
        let written = generate(&config).unwrap();
        assert_eq!(written, vec![dir.path().join("SDL3pp_init.h")]);
        let generated = fs::read_to_string(&written[0]).unwrap();
        assert!(generated.contains("inline void Quit()\n{\n  SDL_Quit();\n}"));

        assert!(update(&config, &Diagnostics::silent()).unwrap().is_empty());
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), generated);
    }

    #[test]
    fn test_update_generates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = Api::new();
        api.insert(ApiFile::new("SDL3pp_empty.h"));
        let api_path = dir.path().join("target.json");
        fs::write(&api_path, to_json(&api).unwrap()).unwrap();
        let config = Config {
            api: Some(api_path),
            ..config_in(dir.path())
        };
        let written = update(&config, &Diagnostics::silent()).unwrap();
        assert_eq!(written, vec![dir.path().join("SDL3pp_empty.h")]);
        assert!(fs::read_to_string(&written[0]).unwrap().starts_with("#ifndef SDL3PP_EMPTY_H_\n"));
    }
}
