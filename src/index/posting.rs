use crate::core::error::{Error, Result};
use crate::core::types::DocId;

/// One posting in a term's postings list: either a plain
/// `(doc_id, tf)` pair or `(doc_id, positions[])` for positional indexes.
/// A single posting list never mixes the two.
#[derive(Debug, Clone, PartialEq)]
pub enum Posting {
    NonPositional { doc_id: DocId, tf: u32 },
    Positional { doc_id: DocId, positions: Vec<u32> },
}

impl Posting {
    pub fn doc_id(&self) -> DocId {
        match self {
            Posting::NonPositional { doc_id, .. } => *doc_id,
            Posting::Positional { doc_id, .. } => *doc_id,
        }
    }

    /// Term frequency: the stored `tf`, or the number of positions.
    pub fn tf(&self) -> u32 {
        match self {
            Posting::NonPositional { tf, .. } => *tf,
            Posting::Positional { positions, .. } => positions.len() as u32,
        }
    }

    /// Encode as the `doc_id:tf` or `doc_id:pos,pos,...` group used in the
    /// postings file.
    pub fn to_group(&self) -> String {
        match self {
            Posting::NonPositional { doc_id, tf } => format!("{}:{}", doc_id.value(), tf),
            Posting::Positional { doc_id, positions } => {
                let positions = positions.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
                format!("{}:{}", doc_id.value(), positions)
            }
        }
    }

    /// Parse one `doc_id:tf` or `doc_id:pos,pos,...` group. `positional`
    /// selects which of the two formats to expect.
    pub fn parse_group(group: &str, positional: bool) -> Result<Self> {
        let (doc_id_str, rest) = group
            .split_once(':')
            .ok_or_else(|| Error::data(format!("malformed posting group '{group}'")))?;
        let doc_id = DocId(doc_id_str.parse().map_err(|_| Error::data(format!("bad doc_id in '{group}'")))?);

        if positional {
            let positions = rest
                .split(',')
                .map(|p| p.parse::<u32>().map_err(|_| Error::data(format!("bad position in '{group}'"))))
                .collect::<Result<Vec<u32>>>()?;
            Ok(Posting::Positional { doc_id, positions })
        } else {
            let tf = rest.parse().map_err(|_| Error::data(format!("bad tf in '{group}'")))?;
            Ok(Posting::NonPositional { doc_id, tf })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positional_round_trips_through_its_group_encoding() {
        let posting = Posting::NonPositional { doc_id: DocId(3), tf: 7 };
        let group = posting.to_group();
        assert_eq!(group, "3:7");
        assert_eq!(Posting::parse_group(&group, false).unwrap(), posting);
    }

    #[test]
    fn positional_round_trips_through_its_group_encoding() {
        let posting = Posting::Positional { doc_id: DocId(1), positions: vec![0, 4, 9] };
        let group = posting.to_group();
        assert_eq!(group, "1:0,4,9");
        assert_eq!(Posting::parse_group(&group, true).unwrap(), posting);
    }
}
