use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};

#[derive(Debug)]
pub struct EdgeList {
    pub num_nodes: usize,
    pub edges: Vec<(u32, u32, u32)>,
}

/// Reads the edge-list format: any number of leading `%` comment
/// lines, a `rows cols nnz` header (dimensions are not trusted), then
/// one `src dst weight` triple per line. The node count is derived
/// from the largest id seen.
pub fn read_edge_list(path: &Path) -> Result<EdgeList> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    parse_edge_list(BufReader::new(file))
}

pub fn parse_edge_list<R: BufRead>(reader: R) -> Result<EdgeList> {
    let mut edges = Vec::new();
    let mut max_id: Option<u32> = None;
    let mut header_seen = false;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("read line {line_no}"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !header_seen {
            if line.starts_with('%') {
                continue;
            }
            parse_fields::<u64>(line)
                .with_context(|| format!("line {line_no}: expected 'rows cols nnz' header"))?;
            header_seen = true;
            continue;
        }
        let [src, dst, weight] = parse_fields::<u32>(line)
            .with_context(|| format!("line {line_no}: expected 'src dst weight'"))?;
        max_id = Some(max_id.unwrap_or(0).max(src).max(dst));
        edges.push((src, dst, weight));
    }

    if !header_seen {
        bail!("file has no contents");
    }

    Ok(EdgeList {
        num_nodes: max_id.map_or(0, |id| id as usize + 1),
        edges,
    })
}

fn parse_fields<T: std::str::FromStr>(line: &str) -> Result<[T; 3]> {
    let mut fields = line.split_whitespace();
    let mut next = || -> Result<T> {
        let field = fields.next().context("missing field")?;
        field.parse().ok().with_context(|| format!("bad field '{field}'"))
    };
    let parsed = [next()?, next()?, next()?];
    if fields.next().is_some() {
        bail!("trailing fields");
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<EdgeList> {
        parse_edge_list(Cursor::new(text))
    }

    #[test]
    fn comments_header_and_edges() {
        let list = parse(
            "% MatrixMarket-style comment\n\
             % another one\n\
             5 5 3\n\
             0 1 2\n\
             1 2 1\n\
             2 4 7\n",
        )
        .unwrap();
        assert_eq!(list.num_nodes, 5);
        assert_eq!(list.edges, vec![(0, 1, 2), (1, 2, 1), (2, 4, 7)]);
    }

    #[test]
    fn node_count_from_max_id() {
        let list = parse("9 9 1\n3 7 1\n").unwrap();
        assert_eq!(list.num_nodes, 8);
    }

    #[test]
    fn header_with_no_edges() {
        let list = parse("0 0 0\n").unwrap();
        assert_eq!(list.num_nodes, 0);
        assert!(list.edges.is_empty());
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(parse("").is_err());
        assert!(parse("% only comments\n").is_err());
    }

    #[test]
    fn malformed_edge_reports_line_number() {
        let err = parse("3 3 2\n0 1 2\n0 two 3\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 3"));
    }

    #[test]
    fn trailing_fields_rejected() {
        assert!(parse("2 2 1\n0 1 2 99\n").is_err());
    }

    #[test]
    fn blank_lines_tolerated() {
        let list = parse("\n2 2 1\n\n0 1 4\n\n").unwrap();
        assert_eq!(list.edges, vec![(0, 1, 4)]);
    }
}
