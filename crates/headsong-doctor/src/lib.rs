//! Doctor command for credential and connectivity checks
//!
//! Static checks look at the resolved configuration only: they report
//! whether each credential variable is set without ever reading its value
//! into the output. Probes make one minimal live request to the news and
//! lyrics services. The song service is never probed because any request
//! starts a billable generation job.

pub use headsong_utils::types::{CheckStatus, DoctorCheck, DoctorOutput};

use chrono::Utc;
use headsong_adapters::{Adapters, HeadlineRequest, TextRequest};
use headsong_config::{Config, Credential};
use headsong_utils::error::AdapterError;
use headsong_utils::exit_codes::ExitCode;
use headsong_utils::redaction::redact_error_message;
use headsong_utils::types::Service;
use tracing::debug;

/// Prompt used for the lyrics probe
const PROBE_PROMPT: &str = "Say hi";
const PROBE_MAX_TOKENS: u32 = 10;

/// Doctor command implementation
pub struct DoctorCommand {
    config: Config,
}

impl DoctorCommand {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the static checks
    #[must_use]
    pub fn run_with_options(&self) -> DoctorOutput {
        Self::finish(self.static_checks())
    }

    /// Run the static checks plus one live probe per probe-safe service
    pub async fn run_with_probes(&self, adapters: &Adapters) -> DoctorOutput {
        let mut checks = self.static_checks();
        checks.push(self.probe_news(adapters).await);
        checks.push(self.probe_lyrics(adapters).await);
        checks.push(DoctorCheck {
            name: probe_name(Service::Song),
            status: CheckStatus::Warn,
            details: format!(
                "{} not probed: a request would start a billable generation job",
                Service::Song.display_name()
            ),
        });
        Self::finish(checks)
    }

    /// Exit code for a doctor run: missing credentials first, then probe failures.
    #[must_use]
    pub fn exit_code(output: &DoctorOutput) -> ExitCode {
        let failed = |suffix: &str| {
            output
                .checks
                .iter()
                .any(|c| c.status == CheckStatus::Fail && c.name.ends_with(suffix))
        };

        if output.ok {
            ExitCode::SUCCESS
        } else if failed("_credential") {
            ExitCode::NOT_CONFIGURED
        } else if failed("_probe") {
            ExitCode::UPSTREAM_FAILURE
        } else {
            ExitCode::CLI_ARGS
        }
    }

    fn finish(mut checks: Vec<DoctorCheck>) -> DoctorOutput {
        // Stable order for canonical JSON emission
        checks.sort_by(|a, b| a.name.cmp(&b.name));
        let ok = !checks.iter().any(|c| c.status == CheckStatus::Fail);

        DoctorOutput {
            schema_version: "1".to_string(),
            emitted_at: Utc::now(),
            ok,
            checks,
        }
    }

    fn static_checks(&self) -> Vec<DoctorCheck> {
        let mut checks = vec![self.check_config_file()];
        checks.extend(
            Service::ALL
                .iter()
                .map(|&service| self.check_credential(service)),
        );
        checks
    }

    fn check_config_file(&self) -> DoctorCheck {
        let details = match &self.config.source_path {
            Some(path) => format!("Loaded {}", path.display()),
            None => "No config file found; using defaults and environment".to_string(),
        };
        DoctorCheck {
            name: "config_file".to_string(),
            status: CheckStatus::Pass,
            details,
        }
    }

    fn check_credential(&self, service: Service) -> DoctorCheck {
        let name = format!("{}_credential", service.as_str());
        match self.config.credential(service) {
            Credential::Present { env_var, .. } => DoctorCheck {
                name,
                status: CheckStatus::Pass,
                details: format!(
                    "{} API key present in {env_var} (endpoint: {})",
                    service.display_name(),
                    self.config.base_url(service)
                ),
            },
            Credential::Missing { env_var } => DoctorCheck {
                name,
                status: CheckStatus::Fail,
                details: format!(
                    "{} API key not found in environment variable '{env_var}'. \
                     Set this variable or configure api_key_env in [{}]",
                    service.display_name(),
                    service.as_str()
                ),
            },
        }
    }

    async fn probe_news(&self, adapters: &Adapters) -> DoctorCheck {
        let request = HeadlineRequest {
            max_count: 1,
            region: self.config.news.region.clone(),
        };
        let result = adapters.headlines.fetch_headlines(request).await;
        probe_check(Service::News, result.map(|headlines| {
            format!("reachable ({} headline returned)", headlines.len())
        }))
    }

    async fn probe_lyrics(&self, adapters: &Adapters) -> DoctorCheck {
        let request = TextRequest {
            prompt: PROBE_PROMPT.to_string(),
            max_tokens: PROBE_MAX_TOKENS,
        };
        let result = adapters.lyrics.generate_text(request).await;
        probe_check(
            Service::Lyrics,
            result.map(|_| format!("reachable (model {})", self.config.lyrics.model)),
        )
    }
}

fn probe_name(service: Service) -> String {
    format!("{}_probe", service.as_str())
}

fn probe_check(service: Service, result: Result<String, AdapterError>) -> DoctorCheck {
    let (status, details) = match result {
        Ok(summary) => (
            CheckStatus::Pass,
            format!("{} {summary}", service.display_name()),
        ),
        Err(AdapterError::ConfigurationMissing { env_var, .. }) => (
            CheckStatus::Warn,
            format!(
                "{} probe skipped: {env_var} is not set",
                service.display_name()
            ),
        ),
        Err(e) => (CheckStatus::Fail, redact_error_message(&e.to_string())),
    };
    debug!(service = service.as_str(), status = ?status, "Probe finished");

    DoctorCheck {
        name: probe_name(service),
        status,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_keys(services: &[Service]) -> Config {
        let mut builder = Config::builder()
            .base_url(Service::News, "http://127.0.0.1:1/v2/top-headlines")
            .base_url(Service::Lyrics, "http://127.0.0.1:1/v1/messages")
            .base_url(Service::Song, "http://127.0.0.1:1/api/v1/generate");
        for &service in services {
            builder = builder.api_key(service, "test-key-value");
        }
        builder.build().unwrap()
    }

    fn check<'a>(output: &'a DoctorOutput, name: &str) -> &'a DoctorCheck {
        output
            .checks
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("missing check {name}"))
    }

    #[test]
    fn test_checks_sorted_by_name() {
        let doctor = DoctorCommand::new(config_with_keys(&Service::ALL));
        let output = doctor.run_with_options();

        let names: Vec<&str> = output.checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "config_file",
                "lyrics_credential",
                "news_credential",
                "song_credential"
            ]
        );
        assert_eq!(output.schema_version, "1");
    }

    #[test]
    fn test_all_credentials_present_is_ok() {
        let output = DoctorCommand::new(config_with_keys(&Service::ALL)).run_with_options();

        assert!(output.ok);
        assert!(output.checks.iter().all(|c| c.status == CheckStatus::Pass));
        assert_eq!(DoctorCommand::exit_code(&output), ExitCode::SUCCESS);
    }

    #[test]
    fn test_missing_credential_fails_and_names_variable() {
        let output =
            DoctorCommand::new(config_with_keys(&[Service::News, Service::Song])).run_with_options();

        assert!(!output.ok);
        let lyrics = check(&output, "lyrics_credential");
        assert_eq!(lyrics.status, CheckStatus::Fail);
        assert!(lyrics.details.contains("ANTHROPIC_API_KEY"));
        assert_eq!(DoctorCommand::exit_code(&output), ExitCode::NOT_CONFIGURED);
    }

    #[test]
    fn test_key_values_never_appear_in_output() {
        let output = DoctorCommand::new(config_with_keys(&Service::ALL)).run_with_options();

        for check in &output.checks {
            assert!(!check.details.contains("test-key-value"), "{check:?}");
        }
    }

    #[tokio::test]
    async fn test_probes_skip_missing_credentials_and_never_probe_song() {
        let config = config_with_keys(&[]);
        let adapters = Adapters::from_config(&config).unwrap();
        let output = DoctorCommand::new(config).run_with_probes(&adapters).await;

        assert_eq!(check(&output, "news_probe").status, CheckStatus::Warn);
        assert_eq!(check(&output, "lyrics_probe").status, CheckStatus::Warn);
        let song = check(&output, "song_probe");
        assert_eq!(song.status, CheckStatus::Warn);
        assert!(song.details.contains("not probed"));
    }

    #[tokio::test]
    async fn test_unreachable_probe_fails() {
        let config = config_with_keys(&Service::ALL);
        let adapters = Adapters::from_config(&config).unwrap();
        let output = DoctorCommand::new(config).run_with_probes(&adapters).await;

        let news = check(&output, "news_probe");
        assert_eq!(news.status, CheckStatus::Fail);
        assert!(news.details.contains("NewsAPI request failed"), "{}", news.details);
        assert!(!output.ok);
        assert_eq!(DoctorCommand::exit_code(&output), ExitCode::UPSTREAM_FAILURE);
    }

    #[test]
    fn test_probe_check_mapping() {
        let pass = probe_check(Service::News, Ok("reachable".to_string()));
        assert_eq!(pass.status, CheckStatus::Pass);
        assert_eq!(pass.name, "news_probe");

        let upstream = probe_check(
            Service::Lyrics,
            Err(AdapterError::Upstream {
                service: Service::Lyrics,
                status: 401,
                body: "invalid x-api-key".to_string(),
            }),
        );
        assert_eq!(upstream.status, CheckStatus::Fail);
        assert!(upstream.details.contains("401"));
    }
}
