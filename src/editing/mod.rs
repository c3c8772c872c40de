// Copyright 2025 the Sigil Authors
// SPDX-License-Identifier: Apache-2.0

//! Interactive box editing

pub mod gesture;

pub use gesture::{BoxController, Gesture, GestureKind, ResizeCorner};
