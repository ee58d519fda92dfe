use crate::cgto::{cartesian_components, ContractedGTO};
use crate::error::BasisError;
use nalgebra::Vector3;
use periodic_table_on_an_enum::{periodic_table, Element};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const STO_3G: &str = include_str!("../data/sto-3g.nwchem");
const SIX_31G: &str = include_str!("../data/6-31g.nwchem");

/// A contracted shell: shared exponents, one angular momentum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shell {
    pub l: i32,
    pub exponents: Vec<f64>,
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtomicBasis {
    pub symbol: String,
    pub atomic_number: u32,
    pub shells: Vec<Shell>,
}

impl AtomicBasis {
    pub fn max_l(&self) -> i32 {
        self.shells.iter().map(|s| s.l).max().unwrap_or(0)
    }

    /// Smallest and largest primitive exponent among shells of angular
    /// momentum `l`.
    fn exponent_range(&self, l: i32) -> Option<(f64, f64)> {
        self.shells
            .iter()
            .filter(|s| s.l == l)
            .flat_map(|s| s.exponents.iter().copied())
            .fold(None, |range, e| match range {
                None => Some((e, e)),
                Some((lo, hi)) => Some((lo.min(e), hi.max(e))),
            })
    }
}

/// A named basis set, keyed by atomic number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasisSet {
    pub name: String,
    atoms: BTreeMap<u32, AtomicBasis>,
}

impl BasisSet {
    /// Looks up one of the bundled basis sets (`sto-3g`, `6-31g`).
    pub fn builtin(name: &str) -> Result<Self, BasisError> {
        match name.to_ascii_lowercase().as_str() {
            "sto-3g" | "sto3g" => BasisSet::parse_nwchem("sto-3g", STO_3G),
            "6-31g" => BasisSet::parse_nwchem("6-31g", SIX_31G),
            _ => Err(BasisError::UnknownBasis(name.to_string())),
        }
    }

    // Example of nwchem format:
    //
    // BASIS "ao basis" PRINT
    // O    S
    //       0.1307093214E+03       0.1543289673E+00
    //       0.2380886605E+02       0.5353281423E+00
    //       0.6443608313E+01       0.4446345422E+00
    // O    SP
    //       0.5033151319E+01      -0.9996722919E-01       0.1559162750E+00
    //       0.1169596125E+01       0.3995128261E+00       0.6076837186E+00
    //       0.3803889600E+00       0.7001154689E+00       0.3919573931E+00
    // END
    /// Parses a basis set in NWChem format. `S`, `P`, `D`, `F` and the
    /// combined `SP` (or `L`) shells are understood; extra coefficient
    /// columns on a single-letter shell become separate contractions.
    pub fn parse_nwchem(name: &str, input: &str) -> Result<Self, BasisError> {
        let mut atoms: BTreeMap<u32, AtomicBasis> = BTreeMap::new();
        // (element, shell letters, rows, header line)
        let mut block: Option<(Element, String, Vec<Vec<f64>>, usize)> = None;

        for (idx, raw) in input.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let upper = line.to_ascii_uppercase();
            if upper.starts_with("BASIS") || upper == "END" {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            let header = tokens[0]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic());
            if header {
                let element = element_from_symbol(tokens[0]).ok_or_else(|| BasisError::Parse {
                    line: idx + 1,
                    message: format!("unknown element '{}'", tokens[0]),
                })?;
                if tokens.len() != 2 {
                    return Err(BasisError::Parse {
                        line: idx + 1,
                        message: format!("expected '<element> <shell>', got '{}'", line),
                    });
                }
                if let Some(previous) = block.take() {
                    flush_block(previous, &mut atoms)?;
                }
                block = Some((element, tokens[1].to_ascii_uppercase(), Vec::new(), idx + 1));
                continue;
            }

            let values = tokens
                .iter()
                .map(|t| t.replace(['D', 'd'], "E").parse::<f64>())
                .collect::<Result<Vec<f64>, _>>()
                .map_err(|e| BasisError::Parse {
                    line: idx + 1,
                    message: e.to_string(),
                })?;
            match block.as_mut() {
                Some((_, _, rows, _)) => rows.push(values),
                None => {
                    return Err(BasisError::Parse {
                        line: idx + 1,
                        message: "primitive data before any shell header".to_string(),
                    })
                }
            }
        }

        if let Some(last) = block.take() {
            flush_block(last, &mut atoms)?;
        }

        Ok(BasisSet {
            name: name.to_string(),
            atoms,
        })
    }

    pub fn atom(&self, atomic_number: u32) -> Option<&AtomicBasis> {
        self.atoms.get(&atomic_number)
    }

    pub fn elements(&self) -> impl Iterator<Item = u32> + '_ {
        self.atoms.keys().copied()
    }

    fn require(&self, atomic_number: u32) -> Result<&AtomicBasis, BasisError> {
        self.atom(atomic_number).ok_or_else(|| BasisError::MissingElement {
            basis: self.name.clone(),
            atomic_number,
        })
    }

    /// Places the element's functions at `center`, one contraction per
    /// Cartesian component. Principal quantum numbers count shells of equal
    /// `l` in file order (1s, 2s, 2p, 3s, ...).
    pub fn functions_on(
        &self,
        atomic_number: u32,
        center: Vector3<f64>,
    ) -> Result<Vec<ContractedGTO>, BasisError> {
        let atom = self.require(atomic_number)?;
        let mut seen_per_l: BTreeMap<i32, i32> = BTreeMap::new();
        let mut functions = Vec::new();

        for shell in &atom.shells {
            let count = seen_per_l.entry(shell.l).or_insert(0);
            let n = shell.l + 1 + *count;
            *count += 1;
            for l_xyz in cartesian_components(shell.l) {
                functions.push(ContractedGTO::new(
                    &shell.exponents,
                    &shell.coefficients,
                    l_xyz,
                    center,
                    n,
                ));
            }
        }
        Ok(functions)
    }

    /// Even-tempered fitting basis for the given elements: for every
    /// fitting angular momentum L up to max(1, 2 l_max) the exponents run
    /// geometrically with ratio `beta` over the range spanned by products
    /// of orbital primitives whose angular momenta add up to L.
    pub fn even_tempered(&self, atomic_numbers: &[u32], beta: f64) -> Result<BasisSet, BasisError> {
        let mut atoms = BTreeMap::new();

        for &z in atomic_numbers {
            if atoms.contains_key(&z) {
                continue;
            }
            let atom = self.require(z)?;
            let l_max = atom.max_l();
            let ranges: Vec<Option<(f64, f64)>> =
                (0..=l_max).map(|l| atom.exponent_range(l)).collect();
            let overall = ranges.iter().flatten().fold(None, |acc, &(lo, hi)| match acc {
                None => Some((2.0 * lo, 2.0 * hi)),
                Some((a, b)) => Some((f64::min(a, 2.0 * lo), f64::max(b, 2.0 * hi))),
            });

            let mut shells = Vec::new();
            for big_l in 0..=(2 * l_max).max(1) {
                let mut range: Option<(f64, f64)> = None;
                for l1 in 0..=l_max {
                    let l2 = big_l - l1;
                    if l2 < l1 || l2 > l_max {
                        continue;
                    }
                    if let (Some((lo1, hi1)), Some((lo2, hi2))) =
                        (ranges[l1 as usize], ranges[l2 as usize])
                    {
                        let (lo, hi) = (lo1 + lo2, hi1 + hi2);
                        range = Some(match range {
                            None => (lo, hi),
                            Some((a, b)) => (a.min(lo), b.max(hi)),
                        });
                    }
                }
                let Some((lo, hi)) = range.or(overall) else {
                    continue;
                };
                let count = ((hi / lo).ln() / beta.ln()).ceil().max(0.0) as i32 + 1;
                for k in 0..count {
                    shells.push(Shell {
                        l: big_l,
                        exponents: vec![lo * beta.powi(k)],
                        coefficients: vec![1.0],
                    });
                }
            }

            atoms.insert(
                z,
                AtomicBasis {
                    symbol: atom.symbol.clone(),
                    atomic_number: z,
                    shells,
                },
            );
        }

        Ok(BasisSet {
            name: format!("{}-etb", self.name),
            atoms,
        })
    }
}

/// Case-insensitive element lookup by symbol. Scans the table linearly so
/// that any input, numeric or empty, yields `None`.
pub fn element_from_symbol(symbol: &str) -> Option<Element> {
    periodic_table().find(|element| element.get_symbol().eq_ignore_ascii_case(symbol))
}

fn flush_block(
    (element, letters, rows, header_line): (Element, String, Vec<Vec<f64>>, usize),
    atoms: &mut BTreeMap<u32, AtomicBasis>,
) -> Result<(), BasisError> {
    let parse_error = |message: String| BasisError::Parse {
        line: header_line,
        message,
    };
    if rows.is_empty() {
        return Err(parse_error(format!("shell '{}' has no primitives", letters)));
    }

    // angular momentum of each coefficient column
    let columns: Vec<i32> = match letters.as_str() {
        "SP" | "L" => vec![0, 1],
        single => {
            let l = match single {
                "S" => 0,
                "P" => 1,
                "D" => 2,
                "F" => 3,
                other => return Err(parse_error(format!("unsupported shell type '{}'", other))),
            };
            vec![l; rows[0].len().saturating_sub(1).max(1)]
        }
    };

    for (row_idx, row) in rows.iter().enumerate() {
        if row.len() != columns.len() + 1 {
            return Err(BasisError::Parse {
                line: header_line + row_idx + 1,
                message: format!(
                    "expected {} values for shell '{}', got {}",
                    columns.len() + 1,
                    letters,
                    row.len()
                ),
            });
        }
    }

    let z = element.get_atomic_number() as u32;
    let atom = atoms.entry(z).or_insert_with(|| AtomicBasis {
        symbol: element.get_symbol().to_string(),
        atomic_number: z,
        shells: Vec::new(),
    });
    let exponents: Vec<f64> = rows.iter().map(|r| r[0]).collect();
    for (col, &l) in columns.iter().enumerate() {
        atom.shells.push(Shell {
            l,
            exponents: exponents.clone(),
            coefficients: rows.iter().map(|r| r[col + 1]).collect(),
        });
    }
    Ok(())
}
