//! Command implementations.

use std::{io::Write, path::Path};

use ctwire_proto::{Contract, FieldIter, Message, ProtocolError, Text, UnknownFields, skip::Nesting};
use tracing::{info, warn};

use crate::{
    args::{Cli, Command, GlobalOptions},
    error::CliError,
    io::{read_input, write_output},
};

/// Run the parsed command, writing its report to `out`.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<(), CliError> {
    let options = &cli.options;

    match &cli.command {
        Command::Inspect { input } => inspect(input, options, out),
        Command::Fields { input } => fields(input, options, out),
        Command::Reencode { input, output } => reencode(input, output, options, out),
        Command::ToCbor { input, output } => to_cbor(input, output, options, out),
        Command::FromCbor { input, output } => from_cbor(input, output, options, out),
    }
}

fn decode_contract(bytes: &[u8], options: &GlobalOptions) -> Result<Contract, CliError> {
    let contract = Contract::decode_with(bytes, &options.decode_options())?;
    info!(id = %contract.id, len = bytes.len(), "decoded contract");
    Ok(contract)
}

fn inspect(input: &Path, options: &GlobalOptions, out: &mut impl Write) -> Result<(), CliError> {
    let bytes = read_input(input, options.hex)?;
    let contract = decode_contract(&bytes, options)?;
    render_contract(&contract, out).map_err(CliError::Output)
}

fn render_contract(contract: &Contract, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Contract {}", contract.id)?;
    writeln!(out, "  code: {} bytes", contract.code.len())?;

    match &contract.info {
        None => writeln!(out, "  info: absent")?,
        Some(info) => {
            writeln!(out, "  info: lang={} version={}", info.lang, info.version)?;
            for abi in &info.abi {
                let args: Vec<_> = abi.args.iter().map(Text::to_string_lossy).collect();
                writeln!(out, "    abi {}({})", abi.name, args.join(", "))?;
                for limit in &abi.amount_limit {
                    writeln!(out, "      limit {} {}", limit.token, limit.val)?;
                    render_trailer(out, "        ", &limit.unknown_fields)?;
                }
                render_trailer(out, "      ", &abi.unknown_fields)?;
            }
            render_trailer(out, "    ", &info.unknown_fields)?;
        },
    }

    render_trailer(out, "  ", &contract.unknown_fields)
}

fn render_trailer(
    out: &mut impl Write,
    indent: &str,
    unknown: &UnknownFields,
) -> std::io::Result<()> {
    if unknown.is_empty() {
        return Ok(());
    }

    let numbers: Vec<String> = unknown
        .fields()
        .filter_map(Result::ok)
        .map(|field| field.tag.field_number.to_string())
        .collect();
    writeln!(out, "{indent}unknown: {} bytes (fields {})", unknown.len(), numbers.join(", "))
}

fn fields(input: &Path, options: &GlobalOptions, out: &mut impl Write) -> Result<(), CliError> {
    let bytes = read_input(input, options.hex)?;
    if bytes.len() > options.max_input {
        let err = ProtocolError::InputTooLarge { len: bytes.len(), max: options.max_input };
        return Err(err.into());
    }

    let nesting = Nesting::new(options.recursion_limit);
    for field in FieldIter::with_nesting(&bytes, nesting) {
        let field = field?;
        writeln!(
            out,
            "{:>6} {:<16} {:>6}..{:<6} {}",
            field.tag.field_number,
            field.tag.wire_type.name(),
            field.range.start,
            field.range.end,
            hex::encode(field.bytes)
        )
        .map_err(CliError::Output)?;
    }
    Ok(())
}

fn reencode(
    input: &Path,
    output: &Path,
    options: &GlobalOptions,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let bytes = read_input(input, options.hex)?;
    let contract = decode_contract(&bytes, options)?;
    let encoded = contract.encode()?;
    write_output(output, &encoded, options.hex)?;

    let identical = encoded[..] == bytes[..];
    if identical {
        info!(len = encoded.len(), "re-encoded bytes identical");
    } else {
        // Non-canonical field order or repeated singular fields on input
        warn!(input_len = bytes.len(), output_len = encoded.len(), "re-encoded bytes differ");
    }

    writeln!(
        out,
        "{} bytes -> {} bytes: {}",
        bytes.len(),
        encoded.len(),
        if identical { "identical" } else { "differs" }
    )
    .map_err(CliError::Output)
}

fn to_cbor(
    input: &Path,
    output: &Path,
    options: &GlobalOptions,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let bytes = read_input(input, options.hex)?;
    let contract = decode_contract(&bytes, options)?;

    let mut cbor = Vec::new();
    ciborium::into_writer(&contract, &mut cbor).map_err(|err| CliError::Cbor(err.to_string()))?;
    write_output(output, &cbor, false)?;

    writeln!(out, "{} wire bytes -> {} CBOR bytes", bytes.len(), cbor.len())
        .map_err(CliError::Output)
}

fn from_cbor(
    input: &Path,
    output: &Path,
    options: &GlobalOptions,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let cbor = read_input(input, false)?;
    let contract: Contract =
        ciborium::from_reader(cbor.as_slice()).map_err(|err| CliError::Cbor(err.to_string()))?;

    let encoded = contract.encode()?;
    write_output(output, &encoded, options.hex)?;
    info!(id = %contract.id, len = encoded.len(), "encoded contract from CBOR");

    writeln!(out, "{} CBOR bytes -> {} wire bytes", cbor.len(), encoded.len())
        .map_err(CliError::Output)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use ctwire_proto::{Abi, Amount, Info};
    use hex_literal::hex;

    use super::*;

    fn sample() -> Contract {
        Contract {
            id: "vote.iost".into(),
            info: Some(Info {
                lang: "javascript".into(),
                version: "1.0.0".into(),
                abi: vec![Abi::new("vote", ["string"]).with_limit(Amount::new("iost", "10"))],
                ..Info::default()
            }),
            code: "return 1;".into(),
            ..Contract::default()
        }
    }

    fn run_args(args: &[&str]) -> Result<String, CliError> {
        let argv = std::iter::once("ctwire").chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        run(&cli, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn global_options_default_to_codec_limits() {
        let cli = Cli::try_parse_from(["ctwire", "inspect", "in.bin"]).unwrap();
        assert!(!cli.options.hex);
        assert_eq!(cli.options.decode_options(), ctwire_proto::DecodeOptions::default());
    }

    #[test]
    fn inspect_prints_tree() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("vote.bin");
        fs::write(&input, sample().encode().unwrap()).unwrap();

        let report = run_args(&["inspect", input.to_str().unwrap()]).unwrap();
        assert_eq!(
            report,
            concat!(
                "Contract vote.iost\n",
                "  code: 9 bytes\n",
                "  info: lang=javascript version=1.0.0\n",
                "    abi vote(string)\n",
                "      limit iost 10\n",
            )
        );
    }

    #[test]
    fn inspect_reports_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("next.hex");
        // ID "a", then unknown field 4 text "b"
        fs::write(&input, "0a0161 220162\n").unwrap();

        let report = run_args(&["--hex", "inspect", input.to_str().unwrap()]).unwrap();
        assert!(report.contains("  info: absent\n"));
        assert!(report.ends_with("  unknown: 3 bytes (fields 4)\n"));
    }

    #[test]
    fn inspect_renders_non_utf8_text_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.bin");
        // ID "c1", code ff fe
        fs::write(&input, hex!("0a 02 6331 1a 02 fffe")).unwrap();

        let report = run_args(&["inspect", input.to_str().unwrap()]).unwrap();
        assert!(report.starts_with("Contract c1\n  code: 2 bytes\n"));
    }

    #[test]
    fn fields_lists_raw_spans() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.bin");
        fs::write(&input, hex!("0a 01 61 18 07")).unwrap();

        let report = run_args(&["fields", input.to_str().unwrap()]).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("length-delimited"));
        assert!(lines[0].ends_with("0a0161"));
        assert!(lines[1].contains("varint"));
        assert!(lines[1].ends_with("1807"));
    }

    #[test]
    fn reencode_canonical_input_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bin");
        let output = dir.path().join("out.bin");
        let bytes = sample().encode().unwrap();
        fs::write(&input, &bytes).unwrap();

        let report = run_args(&[
            "reencode",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();

        assert!(report.ends_with("identical\n"));
        assert_eq!(fs::read(&output).unwrap(), bytes.to_vec());
    }

    #[test]
    fn reencode_reorders_fields() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bin");
        let output = dir.path().join("out.bin");
        fs::write(&input, hex!("1a 01 78 0a 01 79")).unwrap();

        let report = run_args(&[
            "reencode",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();

        assert!(report.ends_with("differs\n"));
        assert_eq!(fs::read(&output).unwrap(), hex!("0a 01 79 1a 01 78"));
    }

    #[test]
    fn cbor_conversion_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let wire = dir.path().join("vote.bin");
        let cbor = dir.path().join("vote.cbor");
        let back = dir.path().join("back.bin");
        let bytes = sample().encode().unwrap();
        fs::write(&wire, &bytes).unwrap();

        run_args(&["to-cbor", wire.to_str().unwrap(), "-o", cbor.to_str().unwrap()]).unwrap();
        run_args(&["from-cbor", cbor.to_str().unwrap(), "-o", back.to_str().unwrap()]).unwrap();

        assert_eq!(fs::read(&back).unwrap(), bytes.to_vec());
    }

    #[test]
    fn max_input_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("vote.bin");
        fs::write(&input, sample().encode().unwrap()).unwrap();

        let err = run_args(&["--max-input", "4", "inspect", input.to_str().unwrap()]).unwrap_err();
        assert!(matches!(err, CliError::Protocol(ProtocolError::InputTooLarge { max: 4, .. })));
    }

    #[test]
    fn malformed_input_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.bin");
        fs::write(&input, hex!("0a 05 61")).unwrap();

        let err = run_args(&["inspect", input.to_str().unwrap()]).unwrap_err();
        assert!(matches!(err, CliError::Protocol(ProtocolError::Truncated { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = run_args(&["inspect", "/nonexistent/ctwire/input.bin"]).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }
}
