//! External scheme generators
//!
//! A generator writes shared scheme files for one project as a side effect.
//! The discovery engine only talks to the [`SchemeGenerator`] trait, so it can
//! be driven by a fake in tests.

use crate::error::{Result, SchemeError};
use crate::scheme::{self, SCHEME_EXTENSION};
use schemekit_core::config::{GeneratorConfig, GeneratorStrategy};
use schemekit_core::process::{command_exists, CommandSpec};
use serde::Deserialize;
use std::fs;
use std::path::Path;

const GEMFILE: &str = r#"source 'https://rubygems.org'

gem 'xcodeproj'
gem 'json'
"#;

const RECREATE_SCRIPT: &str = r##"require 'xcodeproj'
require 'json'

def scheme_names(dir)
  Dir[File.join(dir, '*.xcscheme')].map { |scheme| File.basename(scheme, '.xcscheme') }.sort
end

begin
  project_path = ENV['project_path'].to_s
  raise 'empty project_path' if project_path.empty?

  user = ENV['USER'].to_s
  shared_dir = File.join(project_path, 'xcshareddata', 'xcschemes')
  user_dir = File.join(project_path, 'xcuserdata', "#{user}.xcuserdatad", 'xcschemes')

  if scheme_names(user_dir).empty?
    project = Xcodeproj::Project.open(project_path)
    project.recreate_user_schemes(true)
  end

  user_schemes = scheme_names(user_dir)
  raise 'failed to recreate user schemes' if user_schemes.empty?

  user_schemes.each { |scheme| Xcodeproj::XCScheme.share_scheme(project_path, scheme) }

  shared = scheme_names(shared_dir)
  raise 'failed to share user schemes' if shared.empty?

  puts({ schemes: shared }.to_json)
rescue => e
  puts({ error: "#{e}\n#{(e.backtrace || []).join("\n")}" }.to_json)
end
"##;

/// Schemes a generator wrote for one project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generated {
    pub written: Vec<String>,
}

/// Produces shared schemes for a project
pub trait SchemeGenerator {
    /// Short name for logs and reports
    fn name(&self) -> &'static str;

    /// Write shared schemes for `project`, returning the names written
    fn generate(&self, project: &Path) -> Result<Generated>;
}

/// Build the generator selected by configuration
pub fn from_config(config: &GeneratorConfig) -> Box<dyn SchemeGenerator> {
    let recreate = XcodeprojGenerator {
        ruby: config.ruby.clone(),
        use_bundler: config.use_bundler,
    };

    match config.strategy {
        GeneratorStrategy::Recreate => Box::new(recreate),
        GeneratorStrategy::ShareUserSchemes => Box::new(ShareUserSchemes),
        GeneratorStrategy::Auto => Box::new(FallbackGenerator {
            primary: Box::new(ShareUserSchemes),
            fallback: Box::new(recreate),
        }),
    }
}

/// Recreates default schemes with the `xcodeproj` Ruby gem
#[derive(Debug, Clone)]
pub struct XcodeprojGenerator {
    pub ruby: String,
    pub use_bundler: bool,
}

#[derive(Debug, Deserialize)]
struct ScriptOutput {
    #[serde(default)]
    schemes: Vec<String>,
    error: Option<String>,
}

impl XcodeprojGenerator {
    fn parse_output(project: &Path, stdout: &str) -> Result<Generated> {
        let line = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| SchemeError::generation(project, "generator produced no output"))?;

        let output: ScriptOutput = serde_json::from_str(line).map_err(|e| {
            SchemeError::generation(project, format!("unparseable generator output ({e}): {line}"))
        })?;

        if let Some(error) = output.error {
            return Err(SchemeError::generation(project, error.trim()));
        }

        Ok(Generated {
            written: output.schemes,
        })
    }
}

impl SchemeGenerator for XcodeprojGenerator {
    fn name(&self) -> &'static str {
        "recreate"
    }

    fn generate(&self, project: &Path) -> Result<Generated> {
        let workdir = tempfile::Builder::new()
            .prefix("schemekit")
            .tempdir()
            .map_err(|e| SchemeError::io(std::env::temp_dir(), e))?;

        let script = workdir.path().join("recreate_schemes.rb");
        fs::write(&script, RECREATE_SCRIPT).map_err(|e| SchemeError::io(&script, e))?;
        let script_arg = script.to_string_lossy().to_string();

        let project_dir = project.parent().unwrap_or(Path::new("."));
        let project_env = project.to_string_lossy().to_string();
        let failed = |e: schemekit_core::Error| SchemeError::generation(project, e.to_string());

        let command = if self.use_bundler {
            if !command_exists("bundle") {
                return Err(SchemeError::generation(
                    project,
                    "bundle not found in PATH; install Bundler or set generator.use_bundler = false",
                ));
            }

            let gemfile = workdir.path().join("Gemfile");
            fs::write(&gemfile, GEMFILE).map_err(|e| SchemeError::io(&gemfile, e))?;
            let gemfile_env = gemfile.to_string_lossy().to_string();

            tracing::debug!(gemfile = %gemfile.display(), "Installing xcodeproj gem");
            CommandSpec::new("bundle")
                .args(&["install"])
                .current_dir(project_dir)
                .env("BUNDLE_GEMFILE", gemfile_env.clone())
                .run_checked()
                .map_err(failed)?;

            CommandSpec::new("bundle")
                .args(&["exec", self.ruby.as_str(), script_arg.as_str()])
                .env("BUNDLE_GEMFILE", gemfile_env)
        } else {
            CommandSpec::new(&self.ruby).args(&[script_arg.as_str()])
        };

        tracing::info!(project = %project.display(), "Recreating schemes");
        let result = command
            .current_dir(project_dir)
            .env("project_path", project_env)
            .env("LC_ALL", "en_US.UTF-8")
            .run_checked()
            .map_err(failed)?;

        Self::parse_output(project, &result.stdout)
    }
}

/// Shares existing user schemes by copying them into the shared directory
#[derive(Debug, Clone, Copy, Default)]
pub struct ShareUserSchemes;

impl SchemeGenerator for ShareUserSchemes {
    fn name(&self) -> &'static str {
        "share-user-schemes"
    }

    fn generate(&self, project: &Path) -> Result<Generated> {
        let user_schemes: Vec<_> = scheme::list_schemes(project, false)?
            .into_iter()
            .filter(|s| !s.is_shared())
            .collect();

        if user_schemes.is_empty() {
            return Err(SchemeError::generation(project, "no user schemes to share"));
        }

        let shared_dir = scheme::shared_schemes_dir(project);
        fs::create_dir_all(&shared_dir).map_err(|e| SchemeError::io(&shared_dir, e))?;

        let mut written = Vec::new();
        for user_scheme in &user_schemes {
            let target = shared_dir.join(format!("{}.{SCHEME_EXTENSION}", user_scheme.name()));
            if target.exists() {
                continue;
            }

            fs::copy(user_scheme.file(), &target).map_err(|e| SchemeError::io(&target, e))?;
            tracing::debug!(scheme = user_scheme.name(), "Shared user scheme");
            written.push(user_scheme.name().to_string());
        }

        if written.is_empty() {
            return Err(SchemeError::generation(project, "no user scheme could be shared"));
        }

        Ok(Generated { written })
    }
}

/// Tries `primary`, then `fallback` when it fails
pub struct FallbackGenerator {
    pub primary: Box<dyn SchemeGenerator>,
    pub fallback: Box<dyn SchemeGenerator>,
}

impl SchemeGenerator for FallbackGenerator {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn generate(&self, project: &Path) -> Result<Generated> {
        match self.primary.generate(project) {
            Ok(generated) => Ok(generated),
            Err(e) => {
                tracing::info!(
                    project = %project.display(),
                    error = %e,
                    "{} failed, falling back to {}",
                    self.primary.name(),
                    self.fallback.name()
                );
                self.fallback.generate(project)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{add_shared_scheme, add_user_scheme, make_project, SCHEME_WITHOUT_TESTS};

    struct Fails;

    impl SchemeGenerator for Fails {
        fn name(&self) -> &'static str {
            "fails"
        }

        fn generate(&self, project: &Path) -> Result<Generated> {
            Err(SchemeError::generation(project, "boom"))
        }
    }

    #[test]
    fn test_share_user_schemes_copies_into_shared_dir() {
        let dir = tempfile::tempdir().unwrap();
        let project = make_project(dir.path(), "App");
        add_user_scheme(&project, "jane", "App", SCHEME_WITHOUT_TESTS);
        add_user_scheme(&project, "jane", "Tools", SCHEME_WITHOUT_TESTS);

        let generated = ShareUserSchemes.generate(&project).unwrap();
        assert_eq!(generated.written, vec!["App", "Tools"]);

        let shared: Vec<_> = scheme::list_schemes(&project, false)
            .unwrap()
            .into_iter()
            .filter(|s| s.is_shared())
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(shared, vec!["App", "Tools"]);
    }

    #[test]
    fn test_share_user_schemes_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let project = make_project(dir.path(), "App");
        let existing = add_shared_scheme(&project, "App", "<Scheme/>");
        add_user_scheme(&project, "jane", "App", SCHEME_WITHOUT_TESTS);
        add_user_scheme(&project, "jane", "Other", SCHEME_WITHOUT_TESTS);

        let generated = ShareUserSchemes.generate(&project).unwrap();
        assert_eq!(generated.written, vec!["Other"]);
        assert_eq!(fs::read_to_string(existing).unwrap(), "<Scheme/>");
    }

    #[test]
    fn test_share_user_schemes_without_user_schemes() {
        let dir = tempfile::tempdir().unwrap();
        let project = make_project(dir.path(), "App");

        let err = ShareUserSchemes.generate(&project).unwrap_err();
        assert!(matches!(err, SchemeError::GenerationFailed { .. }));
    }

    #[test]
    fn test_fallback_used_after_primary_failure() {
        let dir = tempfile::tempdir().unwrap();
        let project = make_project(dir.path(), "App");
        add_user_scheme(&project, "jane", "App", SCHEME_WITHOUT_TESTS);

        let generator = FallbackGenerator {
            primary: Box::new(Fails),
            fallback: Box::new(ShareUserSchemes),
        };
        assert_eq!(generator.generate(&project).unwrap().written, vec!["App"]);

        let generator = FallbackGenerator {
            primary: Box::new(Fails),
            fallback: Box::new(Fails),
        };
        assert!(generator.generate(&project).is_err());
    }

    #[test]
    fn test_parse_script_output() {
        let project = Path::new("/w/App.xcodeproj");

        let generated =
            XcodeprojGenerator::parse_output(project, "Fetching gems\n{\"schemes\":[\"App\"]}\n")
                .unwrap();
        assert_eq!(generated.written, vec!["App"]);

        let err = XcodeprojGenerator::parse_output(project, "{\"error\":\"no targets\"}").unwrap_err();
        assert!(err.to_string().contains("no targets"));

        let err = XcodeprojGenerator::parse_output(project, "not json").unwrap_err();
        assert!(err.to_string().contains("unparseable"));

        let err = XcodeprojGenerator::parse_output(project, "  \n").unwrap_err();
        assert!(matches!(err, SchemeError::GenerationFailed { .. }));
    }

    #[test]
    fn test_recreate_script_is_complete() {
        assert!(RECREATE_SCRIPT.starts_with("require 'xcodeproj'\n"));
        assert!(RECREATE_SCRIPT.contains(r##""#{user}.xcuserdatad""##));
        assert!(RECREATE_SCRIPT.contains("Xcodeproj::XCScheme.share_scheme(project_path, scheme)"));
        assert!(RECREATE_SCRIPT.contains("rescue => e"));
        assert!(RECREATE_SCRIPT.ends_with("}.to_json)\nend\n"));
    }

    #[test]
    fn test_from_config_strategies() {
        let mut config = GeneratorConfig::default();
        assert_eq!(from_config(&config).name(), "auto");

        config.strategy = GeneratorStrategy::Recreate;
        assert_eq!(from_config(&config).name(), "recreate");

        config.strategy = GeneratorStrategy::ShareUserSchemes;
        assert_eq!(from_config(&config).name(), "share-user-schemes");
    }

    #[test]
    fn test_missing_interpreter_is_generation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let project = make_project(dir.path(), "App");
        let generator = XcodeprojGenerator {
            ruby: "nonexistent_ruby_12345".to_string(),
            use_bundler: false,
        };

        let err = generator.generate(&project).unwrap_err();
        assert!(matches!(err, SchemeError::GenerationFailed { .. }));
    }

    #[cfg(unix)]
    fn fake_interpreter(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-ruby");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().to_string()
    }

    #[cfg(unix)]
    #[test]
    fn test_script_receives_project_path() {
        let dir = tempfile::tempdir().unwrap();
        let project = make_project(dir.path(), "App");
        let ruby = fake_interpreter(
            dir.path(),
            r#"test -f "$1" || exit 9
printf '{"schemes":["%s"]}\n' "$(basename "$project_path" .xcodeproj)""#,
        );

        let generator = XcodeprojGenerator {
            ruby,
            use_bundler: false,
        };
        assert_eq!(generator.generate(&project).unwrap().written, vec!["App"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_script_non_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let project = make_project(dir.path(), "App");
        let ruby = fake_interpreter(dir.path(), "echo 'cannot load xcodeproj' >&2; exit 1");

        let generator = XcodeprojGenerator {
            ruby,
            use_bundler: false,
        };
        let err = generator.generate(&project).unwrap_err();
        assert!(err.to_string().contains("cannot load xcodeproj"));
    }
}
