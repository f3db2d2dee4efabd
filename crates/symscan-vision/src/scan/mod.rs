// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document geometry — quad detection and perspective rectification.

pub mod quad;
pub mod rectify;

pub use quad::QuadDetector;
pub use rectify::{PerspectiveRectifier, RectificationTransform, Rectified, order_quad};
