use std::{convert::Infallible, net::SocketAddr, str::FromStr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::errors::AppError;

pub const ANONYMOUS_VOTER: &str = "anonymous";

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Whatever the request tells us about who sent it.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub client_addr: Option<SocketAddr>,
    pub forwarded_for: Option<String>,
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let client_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let forwarded_for = parts
            .headers
            .get(FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(Self {
            client_addr,
            forwarded_for,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityMode {
    /// One vote per network address per item.
    PerAddress,
    /// Every submission counts as a new voter.
    Unlimited,
}

impl FromStr for IdentityMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "address" | "ip" => Ok(IdentityMode::PerAddress),
            "unlimited" | "none" => Ok(IdentityMode::Unlimited),
            other => Err(AppError::EnvError(format!(
                "Unknown VOTE_IDENTITY '{other}', expected address or unlimited"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IdentityResolver {
    mode: IdentityMode,
    trust_forwarded_for: bool,
}

impl IdentityResolver {
    pub fn new(mode: IdentityMode, trust_forwarded_for: bool) -> Self {
        Self {
            mode,
            trust_forwarded_for,
        }
    }

    /// Best-effort voter key. Never empty; spoofable and shared behind NAT.
    pub fn resolve(&self, ctx: &RequestContext) -> String {
        if self.mode == IdentityMode::Unlimited {
            return format!("{}:{}", ANONYMOUS_VOTER, Uuid::new_v4());
        }

        if self.trust_forwarded_for {
            let forwarded = ctx
                .forwarded_for
                .as_deref()
                .and_then(|raw| raw.split(',').next())
                .map(str::trim)
                .filter(|addr| !addr.is_empty());

            if let Some(addr) = forwarded {
                return addr.to_string();
            }
        }

        ctx.client_addr
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| ANONYMOUS_VOTER.to_string())
    }
}
