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

//! Price sources for the supported Danish retailers.
//!
//! Each retrieval format has one [`PriceSource`](fuelprices_core::PriceSource)
//! implementation; [`create_sources`] maps every configured company to it.

pub mod catalog;
pub mod factory;
pub mod goeasy;
pub mod http;
pub mod parse;
pub mod shell;
pub mod table;
pub mod unox;

pub use catalog::{Product, ProductTable, offered_by, products};
pub use factory::{SourceSettings, create_sources, default_base_url, source_factory};
pub use goeasy::GoEasySource;
pub use http::{SourceClient, build_client};
pub use shell::ShellSource;
pub use table::{HtmlTableSource, PageLayout, RowMarkup};
pub use unox::UnoXSource;
