use bellande_motion_probability::{descriptor_source, errors::CliError, logger, registry};

fn main() {
    let argv: Vec<String> = std::env::args().collect();

    let target = match descriptor_source::console_script() {
        Ok(entry) => entry.target(),
        Err(e) => {
            logger::error(&e.to_string());
            std::process::exit(1);
        }
    };

    let code = match registry::builtin_registry().and_then(|reg| reg.invoke(&target, &argv)) {
        Ok(code) => code,
        Err(e) => {
            let e = CliError::from(e);
            logger::error(&e.to_string());
            e.exit_code()
        }
    };
    std::process::exit(code);
}
