// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Errors and status codes surfaced by the classification core

use thiserror::Error;

/// Status codes reported to callers of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Status {
    Success = 0,
    Failure = -1,
    NoMemory = -2,
    WrongArgLength = -3,
}

impl Status {
    pub fn code(self) -> i8 {
        self as i8
    }

    /// Collapse a core result into its status code
    pub fn from_result<T>(result: &Result<T, ShapeError>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(err) => err.status(),
        }
    }
}

/// Errors raised while building shapes or evaluating them
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("invalid shape: {reason}")]
    InvalidShape { reason: String },

    #[error("scratch buffer allocation of {requested} classifications failed")]
    NoMemory { requested: usize },

    #[error("wrong argument length: expected {expected}, found {found}")]
    WrongArgLength { expected: usize, found: usize },

    #[error("shape handle is not registered in this arena")]
    UnknownShape,

    #[error("surface handle is not registered in this arena")]
    UnknownSurface,

    #[error("{0}")]
    Failure(String),
}

impl ShapeError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ShapeError::InvalidShape {
            reason: reason.into(),
        }
    }

    /// Status code this error is reported as
    pub fn status(&self) -> Status {
        match self {
            ShapeError::NoMemory { .. } => Status::NoMemory,
            ShapeError::WrongArgLength { .. } => Status::WrongArgLength,
            ShapeError::InvalidShape { .. }
            | ShapeError::UnknownShape
            | ShapeError::UnknownSurface
            | ShapeError::Failure(_) => Status::Failure,
        }
    }
}
