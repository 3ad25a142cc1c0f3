// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod category_walk_test;
pub mod offer_chain_test;
pub mod regions_test;
pub mod sitemap_discovery_test;
