// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — the I/O collaborators around the scan loop.
//
// Each service is a small trait plus a file-backed implementation, so the
// session can be driven by in-memory fakes in tests.

pub mod capture;
pub mod log_sink;
pub mod snapshot;
