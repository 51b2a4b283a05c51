//! Reading and writing the DIMACS CNF format (spec §6).
use std::io::{self, BufRead, Write};

use crate::cnf::CnfFormula;
use crate::error::DimacsError;
use crate::lit::Lit;

/// Parse a DIMACS CNF formula from `input`.
///
/// Accepts the usual dialect: comment lines starting with `c`, a single `p cnf <vars> <clauses>`
/// header, and whitespace- or newline-separated clauses of 1-based signed integers terminated by
/// `0`. The header's declared variable and clause counts are advisory; they are not checked
/// against the actual content, matching common solver behavior.
pub fn parse_dimacs(input: impl BufRead) -> Result<CnfFormula, DimacsError> {
    let mut formula = CnfFormula::new();
    let mut clause: Vec<Lit> = vec![];
    let mut seen_header = false;

    for (line_no, line) in input.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('c') {
            continue;
        }

        if line.starts_with('p') {
            let mut fields = line.split_whitespace();
            fields.next();
            let format = fields.next();
            if format != Some("cnf") {
                return Err(DimacsError::parse(line_no, "expected 'p cnf' header"));
            }
            seen_header = true;
            continue;
        }

        for token in line.split_whitespace() {
            let value: isize = token
                .parse()
                .map_err(|_| DimacsError::parse(line_no, format!("invalid literal '{}'", token)))?;

            if value == 0 {
                formula.add_clause(std::mem::take(&mut clause));
            } else {
                clause.push(Lit::from_dimacs(value));
            }
        }
    }

    if !clause.is_empty() {
        return Err(DimacsError::parse(
            0,
            "trailing clause not terminated by 0",
        ));
    }

    if !seen_header {
        log::debug!("dimacs input had no 'p cnf' header, inferring size from clauses");
    }

    Ok(formula)
}

/// Write `formula` in DIMACS CNF format to `output`.
pub fn write_dimacs(formula: &CnfFormula, mut output: impl Write) -> io::Result<()> {
    writeln!(output, "p cnf {} {}", formula.var_count(), formula.len())?;

    for clause in formula.iter() {
        for lit in clause {
            itoa::write(&mut output, lit.to_dimacs())?;
            output.write_all(b" ")?;
        }
        output.write_all(b"0\n")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let input = b"c a comment\np cnf 3 2\n1 -2 3 0\n-1 2 0\n";
        let formula = parse_dimacs(&input[..]).unwrap();
        assert_eq!(formula.var_count(), 3);
        assert_eq!(formula.len(), 2);

        let mut out = vec![];
        write_dimacs(&formula, &mut out).unwrap();
        let reparsed = parse_dimacs(&out[..]).unwrap();
        assert_eq!(formula, reparsed);
    }

    #[test]
    fn rejects_garbage_header() {
        let input = b"p wcnf 3 2\n1 2 0\n";
        assert!(parse_dimacs(&input[..]).is_err());
    }

    #[test]
    fn rejects_unterminated_clause() {
        let input = b"p cnf 2 1\n1 2\n";
        assert!(parse_dimacs(&input[..]).is_err());
    }
}
