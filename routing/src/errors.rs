// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The error results used by this library.

use crate::encapsulation::InvalidVni;
use lpm::prefix::PrefixError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RouterError {
    #[error("No interface named '{0}'")]
    NoSuchInterface(String),

    #[error("An interface named '{0}' already exists")]
    InterfaceExists(String),

    #[error("No VRF named '{0}'")]
    NoSuchVrf(String),

    #[error("A VRF named '{0}' already exists")]
    VrfExists(String),

    #[error("Invalid VNI: {0}")]
    VniInvalid(#[from] InvalidVni),

    #[error("Invalid prefix: {0}")]
    InvalidPrefix(#[from] PrefixError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(&'static str),
}
