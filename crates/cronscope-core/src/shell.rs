// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

/// Quotes `arg` as a single POSIX shell word.
///
/// The argument is wrapped in single quotes and every embedded single quote
/// is closed, emitted inside double quotes, and reopened.
pub fn quote(arg: &str) -> String {
	let mut quoted = String::with_capacity(arg.len() + 2);
	quoted.push('\'');
	for ch in arg.chars() {
		if ch == '\'' {
			quoted.push_str("'\"'\"'");
		} else {
			quoted.push(ch);
		}
	}
	quoted.push('\'');
	quoted
}
