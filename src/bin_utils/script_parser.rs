use std::io::Read;

use csv::{StringRecordsIntoIter, Trim};

/// One host call: a function name followed by its string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub function: String,
    pub args: Vec<String>,
}

/// Parses an invocation script: headerless CSV rows of
/// `function,arg1,arg2,...`, `#` starts a comment line.
///
/// Unreadable rows are yielded as errors and parsing carries on with the next
/// row. An I/O error ends the iteration.
pub struct ScriptParser<R> {
    iter: StringRecordsIntoIter<R>,
    done: bool,
}

impl<R> ScriptParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(Trim::All)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(source);

        Self {
            iter: reader.into_records(),
            done: false,
        }
    }
}

impl<R> Iterator for ScriptParser<R>
where
    R: Read,
{
    type Item = (u64, Result<Invocation, csv::Error>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let record = match self.iter.next()? {
                Ok(record) => record,
                Err(err) => {
                    self.done = err.is_io_error();
                    let line = err.position().map_or(0, |pos| pos.line());
                    return Some((line, Err(err)));
                }
            };
            let line = record.position().map_or(0, |pos| pos.line());
            let mut fields = record.iter();
            let Some(function) = fields.next().filter(|f| !f.is_empty()) else {
                continue;
            };
            return Some((
                line,
                Ok(Invocation {
                    function: function.to_string(),
                    args: fields.map(ToOwned::to_owned).collect(),
                }),
            ));
        }
    }
}
