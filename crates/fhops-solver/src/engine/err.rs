// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownOperatorError {
    name: String,
}

impl UnknownOperatorError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for UnknownOperatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown operator '{}'", self.name)
    }
}

impl std::error::Error for UnknownOperatorError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MalformedWeightError {
    entry: String,
}

impl MalformedWeightError {
    pub fn new(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
        }
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }
}

impl std::fmt::Display for MalformedWeightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Malformed operator weight '{}'. Expected name=weight with a finite, non-negative weight.",
            self.entry
        )
    }
}

impl std::error::Error for MalformedWeightError {}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidParameterError {
    parameter: &'static str,
    value: String,
    expected: &'static str,
}

impl InvalidParameterError {
    pub fn new(parameter: &'static str, value: impl ToString, expected: &'static str) -> Self {
        Self {
            parameter,
            value: value.to_string(),
            expected,
        }
    }

    pub fn parameter(&self) -> &'static str {
        self.parameter
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expected(&self) -> &'static str {
        self.expected
    }
}

impl std::fmt::Display for InvalidParameterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid {} {}. Expected {}.",
            self.parameter, self.value, self.expected
        )
    }
}

impl std::error::Error for InvalidParameterError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoOperatorsEnabledError;

impl std::fmt::Display for NoOperatorsEnabledError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Every operator has a weight of zero.")
    }
}

impl std::error::Error for NoOperatorsEnabledError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    UnknownOperator(UnknownOperatorError),
    MalformedWeight(MalformedWeightError),
    InvalidParameter(InvalidParameterError),
    NoOperatorsEnabled(NoOperatorsEnabledError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownOperator(e) => write!(f, "{}", e),
            ConfigError::MalformedWeight(e) => write!(f, "{}", e),
            ConfigError::InvalidParameter(e) => write!(f, "{}", e),
            ConfigError::NoOperatorsEnabled(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<UnknownOperatorError> for ConfigError {
    fn from(err: UnknownOperatorError) -> Self {
        ConfigError::UnknownOperator(err)
    }
}

impl From<MalformedWeightError> for ConfigError {
    fn from(err: MalformedWeightError) -> Self {
        ConfigError::MalformedWeight(err)
    }
}

impl From<InvalidParameterError> for ConfigError {
    fn from(err: InvalidParameterError) -> Self {
        ConfigError::InvalidParameter(err)
    }
}

impl From<NoOperatorsEnabledError> for ConfigError {
    fn from(err: NoOperatorsEnabledError) -> Self {
        ConfigError::NoOperatorsEnabled(err)
    }
}
