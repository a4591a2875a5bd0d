// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

pub mod configure;
pub mod gateway;
pub mod serve;
pub mod validate;
