// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cell geometry parser using pest

use crate::error::ShapeError;
use crate::eval::Simplified;
use crate::shape::{Combinator, ShapeArena, ShapeId, SurfaceId};
use anyhow::{anyhow, bail, Context, Result};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[derive(Parser)]
#[grammar = "io/geometry.pest"]
struct GeometryParser;

/// Parsed cell geometry expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellExpr {
    /// Surface sense; `negative` selects the side where the surface function is below zero
    Surface { number: u32, negative: bool },
    Intersection(Vec<CellExpr>),
    Union(Vec<CellExpr>),
    Complement(Box<CellExpr>),
    /// Another cell, referenced by number
    Cell(u32),
}

/// Parse a cell geometry expression such as `-1 2 (3 : -4) #10`
pub fn parse_cell_geometry(source: &str) -> Result<CellExpr> {
    let mut pairs = GeometryParser::parse(Rule::geometry, source)
        .with_context(|| format!("Failed to parse cell geometry: {source:?}"))?;
    let geometry = pairs
        .next()
        .ok_or_else(|| anyhow!("Empty geometry"))?;
    let union = geometry
        .into_inner()
        .next()
        .ok_or_else(|| anyhow!("Empty geometry"))?;
    parse_union(union)
}

fn parse_union(pair: Pair<Rule>) -> Result<CellExpr> {
    let mut terms = pair
        .into_inner()
        .map(parse_intersection)
        .collect::<Result<Vec<_>>>()?;
    Ok(if terms.len() == 1 {
        terms.remove(0)
    } else {
        CellExpr::Union(terms)
    })
}

fn parse_intersection(pair: Pair<Rule>) -> Result<CellExpr> {
    let mut factors = pair
        .into_inner()
        .map(parse_factor)
        .collect::<Result<Vec<_>>>()?;
    Ok(if factors.len() == 1 {
        factors.remove(0)
    } else {
        CellExpr::Intersection(factors)
    })
}

fn parse_factor(pair: Pair<Rule>) -> Result<CellExpr> {
    match pair.as_rule() {
        Rule::surface => {
            let text = pair.as_str();
            let negative = text.starts_with('-');
            let number = text
                .trim_start_matches(['-', '+'])
                .parse()
                .with_context(|| format!("Invalid surface number: {text}"))?;
            Ok(CellExpr::Surface { number, negative })
        }
        Rule::group => {
            let inner = pair
                .into_inner()
                .next()
                .ok_or_else(|| anyhow!("Empty group"))?;
            parse_union(inner)
        }
        Rule::complement => {
            let inner = pair
                .into_inner()
                .next()
                .ok_or_else(|| anyhow!("Empty complement"))?;
            let target = match inner.as_rule() {
                Rule::cell_ref => {
                    let text = inner.as_str();
                    CellExpr::Cell(
                        text.parse()
                            .with_context(|| format!("Invalid cell number: {text}"))?,
                    )
                }
                _ => parse_factor(inner)?,
            };
            Ok(CellExpr::Complement(Box::new(target)))
        }
        rule => bail!("Unexpected rule in geometry: {rule:?}"),
    }
}

impl CellExpr {
    /// Surface numbers used directly by this expression
    pub fn surfaces(&self) -> BTreeSet<u32> {
        let mut numbers = BTreeSet::new();
        self.visit(&mut |expr| {
            if let CellExpr::Surface { number, .. } = expr {
                numbers.insert(*number);
            }
        });
        numbers
    }

    /// Cell numbers referenced by this expression
    pub fn cells(&self) -> BTreeSet<u32> {
        let mut numbers = BTreeSet::new();
        self.visit(&mut |expr| {
            if let CellExpr::Cell(number) = expr {
                numbers.insert(*number);
            }
        });
        numbers
    }

    fn visit(&self, f: &mut impl FnMut(&CellExpr)) {
        f(self);
        match self {
            CellExpr::Intersection(args) | CellExpr::Union(args) => {
                args.iter().for_each(|arg| arg.visit(f))
            }
            CellExpr::Complement(arg) => arg.visit(f),
            CellExpr::Surface { .. } | CellExpr::Cell(_) => {}
        }
    }

    /// Register the expression in `arena` as a normalized shape
    pub fn build(
        &self,
        arena: &mut ShapeArena,
        surfaces: &HashMap<u32, SurfaceId>,
        cells: &HashMap<u32, ShapeId>,
    ) -> Result<ShapeId, ShapeError> {
        match self {
            CellExpr::Surface { number, negative } => {
                let id = *surfaces.get(number).ok_or(ShapeError::UnknownSurface)?;
                if *negative {
                    arena.complement_surface(id)
                } else {
                    arena.identity(id)
                }
            }
            CellExpr::Cell(number) => cells.get(number).copied().ok_or_else(|| {
                ShapeError::invalid(format!("cell {number} is referenced before definition"))
            }),
            CellExpr::Complement(arg) => {
                let shape = arg.build(arena, surfaces, cells)?;
                arena.complement(shape)
            }
            CellExpr::Intersection(args) | CellExpr::Union(args) => {
                let shapes = args
                    .iter()
                    .map(|arg| arg.build(arena, surfaces, cells))
                    .collect::<Result<Vec<_>, _>>()?;
                if matches!(self, CellExpr::Intersection(_)) {
                    arena.intersection(&shapes)
                } else {
                    arena.union(&shapes)
                }
            }
        }
    }
}

impl CellExpr {
    /// Expression of a simplified shape, with surfaces numbered by `numbers`
    pub fn from_simplified(
        shape: &Simplified,
        numbers: &HashMap<SurfaceId, u32>,
    ) -> Result<CellExpr> {
        match shape {
            Simplified::Constant(value) => bail!("Constant shape ({value}) has no cell geometry"),
            Simplified::Final { surface, negate } => {
                let number = *numbers
                    .get(surface)
                    .ok_or_else(|| anyhow!("Surface {surface:?} has no number"))?;
                Ok(CellExpr::Surface {
                    number,
                    negative: *negate,
                })
            }
            Simplified::Composite {
                combinator,
                children,
            } => {
                let args = children
                    .iter()
                    .map(|child| Self::from_simplified(child, numbers))
                    .collect::<Result<Vec<_>>>()?;
                Ok(match combinator {
                    Combinator::Intersection => CellExpr::Intersection(args),
                    Combinator::Union => CellExpr::Union(args),
                })
            }
        }
    }
}

impl fmt::Display for CellExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellExpr::Surface { number, negative } => {
                write!(f, "{}{number}", if *negative { "-" } else { "" })
            }
            CellExpr::Cell(number) => write!(f, "{number}"),
            CellExpr::Complement(arg) => match arg.as_ref() {
                CellExpr::Cell(_) => write!(f, "#{arg}"),
                _ => write!(f, "#({arg})"),
            },
            CellExpr::Intersection(args) => {
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    match arg {
                        CellExpr::Union(_) => write!(f, "({arg})")?,
                        _ => write!(f, "{arg}")?,
                    }
                }
                Ok(())
            }
            CellExpr::Union(args) => {
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" : ")?;
                    }
                    write!(f, "{arg}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(number: u32, negative: bool) -> CellExpr {
        CellExpr::Surface { number, negative }
    }

    #[test]
    fn test_parse_intersection() {
        let expr = parse_cell_geometry("-1 2 +3").unwrap();
        assert_eq!(
            expr,
            CellExpr::Intersection(vec![surface(1, true), surface(2, false), surface(3, false)])
        );
    }

    #[test]
    fn test_union_binds_weaker() {
        let expr = parse_cell_geometry("1 -2 : 3").unwrap();
        assert_eq!(
            expr,
            CellExpr::Union(vec![
                CellExpr::Intersection(vec![surface(1, false), surface(2, true)]),
                surface(3, false),
            ])
        );
    }

    #[test]
    fn test_parse_groups_and_complements() {
        let expr = parse_cell_geometry("-1 (2 : -3) #(4 5) #12").unwrap();
        let CellExpr::Intersection(factors) = &expr else {
            panic!("expected intersection, got {expr:?}");
        };
        assert_eq!(factors.len(), 4);
        assert_eq!(
            factors[2],
            CellExpr::Complement(Box::new(CellExpr::Intersection(vec![
                surface(4, false),
                surface(5, false)
            ])))
        );
        assert_eq!(factors[3], CellExpr::Complement(Box::new(CellExpr::Cell(12))));
        assert_eq!(expr.surfaces(), BTreeSet::from([1, 2, 3, 4, 5]));
        assert_eq!(expr.cells(), BTreeSet::from([12]));
    }

    #[test]
    fn test_display_reparses() {
        let source = "-1 (2 : -3) #(4 5) #12";
        let expr = parse_cell_geometry(source).unwrap();
        assert_eq!(parse_cell_geometry(&expr.to_string()).unwrap(), expr);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_cell_geometry("").is_err());
        assert!(parse_cell_geometry("1 : ").is_err());
        assert!(parse_cell_geometry("(1 2").is_err());
        assert!(parse_cell_geometry("1 - 2").is_err());
    }

    #[test]
    fn test_build_shape() {
        use crate::geometry::Plane;
        use nalgebra::Vector3;

        let mut arena = ShapeArena::new();
        let surfaces = HashMap::from([
            (1, arena.add_surface(Plane::new(Vector3::x(), 0.0))),
            (2, arena.add_surface(Plane::new(Vector3::y(), 0.0))),
        ]);
        let expr = parse_cell_geometry("1 -2").unwrap();
        let cell = expr.build(&mut arena, &surfaces, &HashMap::new()).unwrap();
        assert_eq!(arena.shape(cell).unwrap().arity(), 2);

        let missing = parse_cell_geometry("1 7").unwrap();
        assert!(matches!(
            missing.build(&mut arena, &surfaces, &HashMap::new()),
            Err(ShapeError::UnknownSurface)
        ));
        let dangling = parse_cell_geometry("#3").unwrap();
        assert!(dangling.build(&mut arena, &surfaces, &HashMap::new()).is_err());
    }

    #[test]
    fn test_expression_of_simplified_shape() {
        use crate::geometry::{Classification, Plane};
        use nalgebra::Vector3;

        let mut arena = ShapeArena::new();
        let a = arena.add_surface(Plane::new(Vector3::x(), 0.0));
        let b = arena.add_surface(Plane::new(Vector3::y(), 0.0));
        let numbers = HashMap::from([(a, 4), (b, 9)]);
        let shape = Simplified::Composite {
            combinator: Combinator::Union,
            children: vec![
                Simplified::Final { surface: a, negate: true },
                Simplified::Final { surface: b, negate: false },
            ],
        };
        let expr = CellExpr::from_simplified(&shape, &numbers).unwrap();
        assert_eq!(expr.to_string(), "-4 : 9");

        assert!(CellExpr::from_simplified(&shape, &HashMap::from([(a, 4)])).is_err());
        let constant = Simplified::Constant(Classification::Inside);
        assert!(CellExpr::from_simplified(&constant, &numbers).is_err());
    }
}
