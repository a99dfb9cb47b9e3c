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

use serde::Serialize;
use serde_json::{Map, Value};

/// State value Home Assistant shows for entities without data
pub const UNAVAILABLE: &str = "unavailable";

/// Body of a `POST /api/states/<entity_id>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HaStateUpdate {
    pub state: String,
    pub attributes: Map<String, Value>,
}

impl HaStateUpdate {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_owned(), value.into());
        self
    }
}
