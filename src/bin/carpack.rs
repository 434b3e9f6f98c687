// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::process::ExitCode;

fn main() -> ExitCode {
    match carpack::carpack_main(std::env::args_os()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(carpack::exit_code(&e))
        }
    }
}
