// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: canvas elements, projects, events and guests.

pub mod element;
pub mod event;
pub mod guest;
pub mod project;
