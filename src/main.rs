//! # forme-table CLI
//!
//! Usage:
//!   forme-table input.json -o output.pdf
//!   echo '{ ... }' | forme-table -o output.pdf
//!   forme-table input.json --draw-calls > calls.json
//!   forme-table --example > quote.json
//!
//! Warnings (overflowing columns, tables running off the page, placeholder
//! substitution) go to stderr; `--verbose` adds debug output.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let level = if args.iter().any(|a| a == "--verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_quote_json());
        return;
    }

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.pdf".to_string());

    let input_path = args
        .iter()
        .enumerate()
        .find(|(i, a)| !a.starts_with('-') && (*i == 0 || args[i - 1] != "-o"))
        .map(|(_, a)| a.clone());

    let input = match read_input(input_path.as_deref()) {
        Ok(input) => input,
        Err(e) => fail(&format!("Failed to read input: {}", e)),
    };

    if args.iter().any(|a| a == "--draw-calls") {
        match forme_table::draw_calls_json(&input) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(&e.to_string()),
        }
        return;
    }

    match forme_table::render_json(&input) {
        Ok(pdf_bytes) => {
            if let Err(e) = fs::write(&output_path, &pdf_bytes) {
                fail(&format!("Failed to write {}: {}", output_path, e));
            }
            eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
        }
        Err(e) => fail(&e.to_string()),
    }
}

fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("✗ {}", message);
    process::exit(1);
}

fn example_quote_json() -> &'static str {
    r##"{
  "metadata": {
    "title": "Quotation Q-2026-0142",
    "author": "Northwind Fabrication"
  },
  "page": "A4",
  "marginTop": 48,
  "gap": 18,
  "tables": [
    {
      "columns": [
        { "header": "Item", "width": { "Fixed": 36 }, "align": "Center" },
        { "header": "Description", "width": { "Flex": { "minWidth": 120, "weight": 3 } } },
        { "header": "Qty", "width": { "Flex": { "minWidth": 40, "maxWidth": 60 } }, "align": "Right" },
        { "header": "Unit Price", "width": { "Flex": { "minWidth": 60 } }, "align": "Right" },
        { "header": "Total", "width": { "Flex": { "minWidth": 70 } }, "align": "Right" }
      ],
      "rows": [
        ["1", "Stainless steel enclosure, IP67, 400 x 300 x 200 mm, with mounting plate", "4", "€ 312.00", "€ 1,248.00"],
        ["2", "DIN rail terminal blocks, 4 mm², grey\nPack of 50", "10", "€ 18.40", "€ 184.00"],
        ["3", "Cable glands M20", "24", "€ 1.15", "€ 27.60"],
        ["4", "On-site installation and commissioning (two technicians, one day)", "1", "€ 960.00", "€ 960.00"],
        [
          "",
          { "text": "Discount (returning customer)", "color": { "r": 0.6, "g": 0.1, "b": 0.1 } },
          "",
          "",
          { "text": "− € 120.96", "color": { "r": 0.6, "g": 0.1, "b": 0.1 } }
        ]
      ],
      "options": {
        "headerBackgroundColor": { "r": 0.12, "g": 0.16, "b": 0.22 },
        "headerTextColor": { "r": 1, "g": 1, "b": 1 },
        "verticalAlign": "Middle"
      }
    },
    {
      "columns": [
        { "header": "", "width": { "Flex": {} }, "align": "Right" },
        { "header": "", "width": { "Fixed": 90 }, "align": "Right" }
      ],
      "rows": [
        ["Subtotal", "€ 2,298.64"],
        ["VAT 21%", "€ 482.71"],
        [{ "text": "Total", "fontSize": 11 }, { "text": "€ 2,781.35", "fontSize": 11 }]
      ],
      "options": {
        "header": false,
        "alternateRowColor": null,
        "borderWidth": 0.5,
        "x": 345.28,
        "width": 210
      }
    }
  ]
}
"##
}
