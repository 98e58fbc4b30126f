// Copyright (c) The Gantry Authors. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::str::FromStr;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Sentinel for an unbounded limit in the textual quota form.
pub const UNBOUNDED: i64 = -1;

/// A request/limit resource quota, parsed from the compact `"request:limit"`
/// form (`"request:-"` for an unbounded limit). The request is interpreted in
/// millicores for CPU and in mebibytes for memory.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quota {
    pub request: i64,
    pub limit: i64,
}

impl Quota {
    /// Request and limit as CPU quantities. Downstream resource APIs reject a
    /// truly unbounded limit, so the sentinel becomes a 999-core ceiling.
    pub fn as_cpu(&self) -> (Quantity, Quantity) {
        let request = Quantity(format!("{}m", self.request));
        if self.limit == UNBOUNDED {
            return (request, Quantity("999".into()));
        }
        (request, Quantity(format!("{}m", self.limit)))
    }

    /// Request and limit as memory quantities, with a 999Gi ceiling standing
    /// in for the unbounded sentinel.
    pub fn as_memory(&self) -> (Quantity, Quantity) {
        let request = Quantity(format!("{}Mi", self.request));
        if self.limit == UNBOUNDED {
            return (request, Quantity("999Gi".into()));
        }
        (request, Quantity(format!("{}Mi", self.limit)))
    }
}

impl FromStr for Quota {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidQuota(s.to_string());

        let (request, limit) = s.split_once(':').ok_or_else(invalid)?;
        if limit.contains(':') {
            return Err(invalid());
        }

        let request: i64 = request.parse().map_err(|_| invalid())?;
        let limit: i64 = if limit == "-" {
            UNBOUNDED
        } else {
            limit.parse().map_err(|_| invalid())?
        };

        if request <= 0 || (limit != UNBOUNDED && limit < request) {
            return Err(invalid());
        }

        Ok(Quota { request, limit })
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.limit == UNBOUNDED {
            write!(f, "{}:-", self.request)
        } else {
            write!(f, "{}:{}", self.request, self.limit)
        }
    }
}

impl TryFrom<String> for Quota {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Quota> for String {
    fn from(quota: Quota) -> Self {
        quota.to_string()
    }
}
