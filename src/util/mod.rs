// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometry and viewport helpers.

pub mod geometry;
pub mod viewport;
