use std::fmt::{self, Write as _};

use crate::error::BackendError;

pub(super) fn push_line(output: &mut String, line: fmt::Arguments<'_>) -> Result<(), BackendError> {
    output
        .write_fmt(line)
        .and_then(|()| output.write_char('\n'))
        .map_err(|source| BackendError::Format { source })
}
