// Copyright 2026 UMA Rocks, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Errors carrying a stable, grep-able code for log alerting.
pub trait CodedError: std::error::Error {
    fn code(&self) -> &str;
}

/// Formats `Debug` for a [`CodedError`] as `[CODE] message` so codes
/// survive `{:?}` logging of wrapped errors.
#[macro_export]
macro_rules! impl_coded_debug {
    ($name:ident) => {
        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let code = self.code();
                write!(f, "{code} {self}")
            }
        }
    };
}

pub use crate::impl_coded_debug;
