use ipp_client::Client;
use ipp_config::Config;
use ipp_turn::SpeechOptions;

/// Shared state for a single command run.
pub(crate) struct Ctx {
    pub(crate) config: Config,
    pub(crate) client: Client,
}

impl Ctx {
    pub(crate) fn new(config: Config) -> Self {
        let client = Client::new(config.base_url.clone()).with_strict_close(config.strict_close);

        Self { config, client }
    }

    pub(crate) fn speech_options(&self) -> SpeechOptions {
        SpeechOptions {
            tts_enabled: self.config.tts_enabled,
            language_code: Some(self.config.language_code.clone()),
        }
    }
}
