// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FuelPrices DK.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use thiserror::Error;

/// Failures talking to the Home Assistant REST API
#[derive(Error, Debug)]
pub enum HaError {
    #[error("HTTP request to Home Assistant failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Home Assistant returned status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid entity id '{0}', expected 'domain.object_id'")]
    InvalidEntityId(String),

    #[error("Home Assistant rejected the access token")]
    AuthenticationFailed,

    #[error("Home Assistant connection not configured: {0}")]
    ConfigError(String),
}

pub type HaResult<T> = Result<T, HaError>;
