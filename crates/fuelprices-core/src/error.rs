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

//! Error types for price retrieval and publishing

use fuelprices_types::Company;
use thiserror::Error;

/// Failure to retrieve one company's price list.
///
/// Recovered per company: the company is left out of the current snapshot
/// and retried on the next cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{company}: request to {url} failed: {reason}")]
    Network {
        company: Company,
        url: String,
        reason: String,
    },

    #[error("{company}: {url} returned HTTP {status}")]
    Status {
        company: Company,
        url: String,
        status: u16,
    },

    #[error("{company}: unparseable response: {reason}")]
    Parse { company: Company, reason: String },

    #[error("{company}: no prices found for the requested fuel types")]
    NoPrices { company: Company },
}

impl FetchError {
    pub fn company(&self) -> Company {
        match self {
            Self::Network { company, .. }
            | Self::Status { company, .. }
            | Self::Parse { company, .. }
            | Self::NoPrices { company } => *company,
        }
    }

    pub fn parse(company: Company, reason: impl Into<String>) -> Self {
        Self::Parse {
            company,
            reason: reason.into(),
        }
    }
}

/// Failure to hand a snapshot over to the host
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publisher '{publisher}' failed: {reason}")]
    Failed { publisher: String, reason: String },

    #[error("publisher '{publisher}' wrote {written} of {total} slots")]
    Partial {
        publisher: String,
        written: usize,
        total: usize,
    },
}

pub type FetchResult<T> = Result<T, FetchError>;
pub type PublishResult<T> = Result<T, PublishError>;
