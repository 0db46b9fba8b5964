pub use std::collections::HashMap;
pub use std::convert::Infallible;
pub use std::sync::Arc;
pub use std::time::Duration;

pub use anyhow::{Context as _, Result};
pub use axum::extract::{Path, Query, State};
pub use axum::http::{header, HeaderMap, StatusCode};
pub use axum::response::{IntoResponse, Response};
pub use axum::routing::{get, post};
pub use axum::{Form, Json};
pub use chrono::{NaiveDateTime, Utc};

pub use crate::db::Db;
pub use crate::utils::config::Config;
pub use crate::utils::error::{AppError, AppResult};
pub use crate::utils::notify::Event;
pub use crate::utils::routing::{AppRouter, AxumRouter, ClientIp};
pub use crate::utils::types::{AppState, SharedAppState};
