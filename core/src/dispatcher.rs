//! The universal dispatcher: one entry point over whichever strategy is
//! active.
//!
//! # Design
//! The strategy is chosen once, when the dispatcher is built, and never
//! swapped afterwards. The dispatcher adds no retries, caching or queuing;
//! every call is forwarded to the strategy unchanged, and the decoder it
//! reports is the strategy's own.

use std::env;

use async_trait::async_trait;
use log::debug;

use crate::decoder::JsonDecoder;
use crate::dispatch::{LiveDispatcher, MockDispatcher, NetworkRequestDispatching};
use crate::environment::Environment;
use crate::error::NetworkingError;
use crate::request::Request;
use crate::response::DataResponse;

pub const DISPATCH_MODE_VAR: &str = "KIPPLE_DISPATCH_MODE";
pub const MOCK_FIXTURES_VAR: &str = "KIPPLE_MOCK_FIXTURES";

/// Selects the strategy behind a `UniversalNetworkRequestDispatcher`.
#[derive(Debug, Clone, Default)]
pub enum DispatchMode {
    /// Live unless `KIPPLE_DISPATCH_MODE=mock`, in which case stubs are
    /// loaded from the file named by `KIPPLE_MOCK_FIXTURES` (if set).
    #[default]
    Automatic,
    Live,
    Mock(MockDispatcher),
}

impl DispatchMode {
    /// Resolve `Automatic` from the process environment.
    pub fn detect() -> Result<Self, NetworkingError> {
        match env::var(DISPATCH_MODE_VAR).ok().as_deref() {
            None | Some("") | Some("live") => Ok(DispatchMode::Live),
            Some("mock") => {
                let mock = match env::var(MOCK_FIXTURES_VAR) {
                    Ok(path) => MockDispatcher::from_fixture_file(path)?,
                    Err(_) => MockDispatcher::new(),
                };
                Ok(DispatchMode::Mock(mock))
            }
            Some(other) => Err(NetworkingError::Configuration(format!(
                "{DISPATCH_MODE_VAR} must be `live` or `mock`, got `{other}`"
            ))),
        }
    }

    fn configured(self, decoder: JsonDecoder) -> Result<Strategy, NetworkingError> {
        match self {
            DispatchMode::Automatic => Self::detect()?.configured(decoder),
            DispatchMode::Live => Ok(Strategy::Live(LiveDispatcher::new(decoder)?)),
            DispatchMode::Mock(mock) => Ok(Strategy::Mock(mock.with_decoder(decoder))),
        }
    }
}

enum Strategy {
    Live(LiveDispatcher),
    Mock(MockDispatcher),
}

impl Strategy {
    fn dispatcher(&self) -> &dyn NetworkRequestDispatching {
        match self {
            Strategy::Live(live) => live,
            Strategy::Mock(mock) => mock,
        }
    }
}

/// Facade that hides which dispatch strategy is active.
pub struct UniversalNetworkRequestDispatcher {
    strategy: Strategy,
}

impl UniversalNetworkRequestDispatcher {
    /// Build a dispatcher. `decoder` defaults to `JsonDecoder::safe_iso8601`.
    pub fn new(decoder: Option<JsonDecoder>, mode: DispatchMode) -> Result<Self, NetworkingError> {
        let strategy = mode.configured(decoder.unwrap_or_default())?;

        debug!(
            "dispatching through the {} strategy",
            match strategy {
                Strategy::Live(_) => "live",
                Strategy::Mock(_) => "mock",
            }
        );

        Ok(Self { strategy })
    }

    /// A dispatcher with the default decoder and automatic mode selection.
    pub fn universal() -> Result<Self, NetworkingError> {
        Self::new(None, DispatchMode::Automatic)
    }

    pub fn universal_with_decoder(decoder: JsonDecoder) -> Result<Self, NetworkingError> {
        Self::new(Some(decoder), DispatchMode::Automatic)
    }

    pub fn is_live(&self) -> bool {
        matches!(self.strategy, Strategy::Live(_))
    }
}

#[async_trait]
impl NetworkRequestDispatching for UniversalNetworkRequestDispatcher {
    fn decoder(&self) -> &JsonDecoder {
        self.strategy.dispatcher().decoder()
    }

    async fn request(
        &self,
        request: &Request,
        environment: &Environment,
    ) -> Result<DataResponse<Vec<u8>>, NetworkingError> {
        self.strategy.dispatcher().request(request, environment).await
    }
}
