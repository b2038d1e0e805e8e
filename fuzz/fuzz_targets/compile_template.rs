#![no_main]

use dataklass::codegen::compile_def;
use dataklass::template::{lexer, parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Fuzz the lexer
        if let Ok(tokens) = lexer::lex(s) {
            // If lexing succeeds, fuzz the parser, then the compiler
            if let Ok(def) = parser::parse(&tokens) {
                if let Ok(code) = compile_def(&def) {
                    let _ = code.disassemble();
                }
            }
        }
    }
});
