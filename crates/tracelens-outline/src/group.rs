use serde::Serialize;

/// Source location of one recorded entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location<'a> {
    pub line: u64,
    pub file: Option<&'a str>,
}

impl<'a> Location<'a> {
    pub fn new(line: u64, file: Option<&'a str>) -> Self {
        Self { line, file }
    }
}

/// Half-open range of entry indices, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One pass through a detected loop.
///
/// `entry_index` is the loop head. The remaining entries of the iteration,
/// `range.start + 1 .. range.end`, are grouped again into `groups`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopIteration {
    pub entry_index: usize,
    pub range: IndexRange,
    pub groups: Vec<StepGroup>,
}

/// A node of the step outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StepGroup {
    Single {
        line: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        file: Option<String>,
        entry_index: usize,
    },
    Loop {
        line: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        file: Option<String>,
        start_index: usize,
        iterations: Vec<LoopIteration>,
    },
}

impl StepGroup {
    pub fn line(&self) -> u64 {
        match self {
            StepGroup::Single { line, .. } | StepGroup::Loop { line, .. } => *line,
        }
    }

    pub fn file(&self) -> Option<&str> {
        match self {
            StepGroup::Single { file, .. } | StepGroup::Loop { file, .. } => file.as_deref(),
        }
    }

    /// Index range of the entries this group covers.
    pub fn range(&self) -> IndexRange {
        match self {
            StepGroup::Single { entry_index, .. } => IndexRange {
                start: *entry_index,
                end: entry_index + 1,
            },
            StepGroup::Loop {
                start_index,
                iterations,
                ..
            } => IndexRange {
                start: *start_index,
                end: iterations.last().map_or(*start_index, |it| it.range.end),
            },
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, StepGroup::Loop { .. })
    }
}

/// Group an ordered trace into singles and (nested) loops.
///
/// The first repeating block found from each position wins, shortest block
/// first. Longer or more natural periods starting at the same position are
/// not considered once a shorter one repeats.
pub fn group_steps(locations: &[Location<'_>]) -> Vec<StepGroup> {
    build_groups(locations, 0)
}

/// Entry indices covered by `groups`, in outline order.
///
/// For any trace `t`, `flatten(&group_steps(t))` is `0..t.len()`.
pub fn flatten(groups: &[StepGroup]) -> Vec<usize> {
    let mut indices = Vec::new();
    collect_indices(groups, &mut indices);
    indices
}

fn collect_indices(groups: &[StepGroup], out: &mut Vec<usize>) {
    for group in groups {
        match group {
            StepGroup::Single { entry_index, .. } => out.push(*entry_index),
            StepGroup::Loop { iterations, .. } => {
                for iteration in iterations {
                    out.push(iteration.entry_index);
                    collect_indices(&iteration.groups, out);
                }
            }
        }
    }
}

/// A repeating block found at some position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Repeat {
    block_len: usize,
    count: usize,
}

fn build_groups(locations: &[Location<'_>], offset: usize) -> Vec<StepGroup> {
    let mut groups = Vec::new();
    let mut index = 0;

    while index < locations.len() {
        let head = locations[index];

        if let Some(Repeat { block_len, count }) = detect_repeat(locations, index) {
            let iterations = (0..count)
                .map(|n| {
                    let local_start = index + n * block_len;
                    let local_end = local_start + block_len;
                    let body = &locations[local_start + 1..local_end];
                    let global_start = offset + local_start;

                    LoopIteration {
                        entry_index: global_start,
                        range: IndexRange {
                            start: global_start,
                            end: offset + local_end,
                        },
                        groups: if body.is_empty() {
                            Vec::new()
                        } else {
                            build_groups(body, global_start + 1)
                        },
                    }
                })
                .collect();

            groups.push(StepGroup::Loop {
                line: head.line,
                file: head.file.map(str::to_string),
                start_index: offset + index,
                iterations,
            });

            index += block_len * count;
            continue;
        }

        groups.push(StepGroup::Single {
            line: head.line,
            file: head.file.map(str::to_string),
            entry_index: offset + index,
        });
        index += 1;
    }

    groups
}

fn detect_repeat(locations: &[Location<'_>], start: usize) -> Option<Repeat> {
    let base = locations.get(start)?;

    for candidate in start + 1..locations.len() {
        if locations[candidate] != *base {
            continue;
        }

        let block_len = candidate - start;
        if !blocks_equal(locations, start, candidate, block_len) {
            continue;
        }

        let mut count = 2;
        let mut next = candidate + block_len;
        while next + block_len <= locations.len() && blocks_equal(locations, start, next, block_len)
        {
            count += 1;
            next += block_len;
        }

        return Some(Repeat { block_len, count });
    }

    None
}

/// Both blocks must lie fully inside the trace.
fn blocks_equal(locations: &[Location<'_>], a: usize, b: usize, len: usize) -> bool {
    match (locations.get(a..a + len), locations.get(b..b + len)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}
