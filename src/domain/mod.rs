// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod record;
pub mod region;
pub mod sink;
pub mod target;
