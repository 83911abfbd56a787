// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persistence, hand-off and export.

pub mod autosave;
pub mod clipboard;
pub mod export;
pub mod media;
pub mod serialization;
pub mod share;
pub mod store;
