//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling where requests go and how usage is budgeted.

use std::sync::Arc;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::conversation::Conversation;
use crate::error::{Error, Result};
use crate::platform::{EnvProbe, FixedProbe, Platform, PlatformProbe};
use crate::transport::{DEFAULT_TIMEOUT, Origins, TransportSelector};
use crate::usage::DEFAULT_BUDGET;

/// Command-line arguments for the gkchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Origin serving the web client.
    #[arrrg(optional, "Origin for web requests (default: http://localhost:3000)", "URL")]
    pub serving_origin: Option<String>,

    /// Deployed backend used from the native wrapper.
    #[arrrg(optional, "Backend origin for native requests", "URL")]
    pub native_origin: Option<String>,

    /// Platform override; otherwise GKCHAT_PLATFORM decides.
    #[arrrg(optional, "Platform: web, ios, android, native", "PLATFORM")]
    pub platform: Option<String>,

    /// Credit budget per conversation.
    #[arrrg(optional, "Credit budget per conversation (default: 100)", "CREDITS")]
    pub budget: Option<u64>,

    /// Seconds to wait for a reply before giving up.
    #[arrrg(optional, "Seconds to wait for a reply (default: 60)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Origins requests are resolved against.
    pub origins: Origins,

    /// Forced platform; `None` defers to the environment.
    pub platform: Option<Platform>,

    /// Credit budget per conversation.
    pub budget: u64,

    /// How long a request may take before it is reported as failed.
    pub timeout: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Serving origin: http://localhost:3000
    /// - Native origin: the deployed backend
    /// - Platform: from the environment
    /// - Budget: 100 credits
    /// - Timeout: 60 seconds
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            origins: Origins::default(),
            platform: None,
            budget: DEFAULT_BUDGET,
            timeout: DEFAULT_TIMEOUT,
            use_color: true,
        }
    }

    /// Sets the origins.
    pub fn with_origins(mut self, origins: Origins) -> Self {
        self.origins = origins;
        self
    }

    /// Forces a platform.
    pub fn with_platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self
    }

    /// Sets the credit budget.
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// The probe requests will consult.
    pub fn probe(&self) -> Arc<dyn PlatformProbe> {
        match self.platform {
            Some(platform) => Arc::new(FixedProbe(platform)),
            None => Arc::new(EnvProbe),
        }
    }

    /// Builds a transport selector with `reqwest` clients.
    pub fn selector(&self) -> Result<TransportSelector> {
        TransportSelector::with_reqwest(self.probe(), self.origins.clone(), self.timeout)
    }

    /// Builds an idle conversation.
    pub fn conversation(&self) -> Conversation {
        Conversation::new(self.budget).with_timeout(Some(self.timeout))
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    fn try_from(args: ChatArgs) -> Result<Self> {
        let defaults = Origins::default();
        let origins = Origins::parse(
            args.serving_origin
                .as_deref()
                .unwrap_or(defaults.serving.as_str()),
            args.native_origin
                .as_deref()
                .unwrap_or(defaults.native.as_str()),
        )?;
        let platform = args
            .platform
            .map(|p| p.parse::<Platform>().map_err(Error::validation))
            .transpose()?;
        let timeout = match args.timeout_secs {
            Some(0) => return Err(Error::validation("--timeout-secs must be positive")),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        Ok(ChatConfig {
            origins,
            platform,
            budget: args.budget.unwrap_or(DEFAULT_BUDGET),
            timeout,
            use_color: !args.no_color,
        })
    }
}
