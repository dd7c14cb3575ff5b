//! Output for the two public operations.
use super::tables::{SimpleTableBuilder, TableBuilder, add_field, add_simple};
use crate::cli::{IdentityArgs, SymbolsArgs};
use crate::styles::Styling;
use elfsym::{ModuleIdentity, Result, SymbolRecord};

pub fn identity(args: &IdentityArgs) -> Result {
    let identity = elfsym::read_module_identity(&args.path, args.level)?;
    identity_table(&identity).println(args.explain);
    Ok(())
}

pub fn symbols(args: &SymbolsArgs) -> Result {
    let symbols = elfsym::collect_external_symbols(&args.path, args.level)?;
    symbols_table(&symbols, args.max_results).println(args.titles, args.explain);
    if args.max_results > 0 && symbols.len() > args.max_results {
        println!("... {} more", symbols.len() - args.max_results);
    }
    Ok(())
}

fn identity_table(identity: &ModuleIdentity) -> SimpleTableBuilder {
    let mut b = SimpleTableBuilder::new();
    add_simple!(
        b,
        "build id",
        identity.build_id.as_deref().unwrap_or("none"),
        "hex of the GNU build id note, used to find debug files under .build-id"
    );
    add_simple!(
        b,
        "debug link",
        identity.debug_link.as_deref().unwrap_or("none"),
        "name of the separate debug file from .gnu_debuglink"
    );
    let crc = identity
        .debug_link_crc
        .map_or("none".to_string(), |crc| format!("{crc:08x}"));
    add_simple!(b, "debug link crc", crc, "CRC32 of the debug file (hex)");
    add_simple!(
        b,
        "symbols",
        identity.symbols.len(),
        "number of external symbols in the selected tables"
    );
    b
}

fn symbols_table(symbols: &[SymbolRecord], max_results: usize) -> TableBuilder {
    let mut builder = TableBuilder::new();
    builder.add_col_l("name", "the symbol name (not demangled)");
    builder.add_col_r("low_pc", "address of the first byte, before relocation (hex)");
    builder.add_col_r("high_pc", "address one past the last byte (hex)");
    builder.add_col_r("size", "high_pc - low_pc (hex), zero for unknown");

    let limit = if max_results == 0 {
        symbols.len()
    } else {
        max_results
    };
    for symbol in symbols.iter().take(limit) {
        add_field!(builder, "name", symbol.name);
        add_field!(builder, "low_pc", "{:x}", symbol.low_pc);
        add_field!(builder, "high_pc", "{:x}", symbol.high_pc);
        add_field!(builder, "size", "{:x}", symbol.size());
    }
    builder
}
