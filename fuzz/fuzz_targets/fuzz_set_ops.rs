#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rangeq::set::{mask_set_op, mask_set_vectorize, range_set_op, range_set_rasterize, RangeSet, SetOp};

#[derive(Debug, Arbitrary)]
struct Input {
    lengths: Vec<u8>,
    lhs: Vec<Vec<bool>>,
    rhs: Vec<Vec<bool>>,
    op: u8,
}

fn to_set(lengths: &[u8], rows: &[Vec<bool>]) -> RangeSet {
    let mut set = RangeSet::new();
    for (entity, (&len, row)) in lengths.iter().zip(rows).enumerate() {
        let mut intervals = Vec::new();
        let mut start = None;
        for frame in 0..len as i32 {
            let bit = row.get(frame as usize).copied().unwrap_or(false);
            match (start, bit) {
                (None, true) => start = Some(frame),
                (Some(s), false) => {
                    intervals.push(rangeq::set::Interval::new(s, frame));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            intervals.push(rangeq::set::Interval::new(s, len as i32));
        }
        if !intervals.is_empty() {
            set.push(entity as u32, &intervals);
        }
    }
    set
}

fuzz_target!(|input: Input| {
    // Both representations must agree on every operator
    let lengths: Vec<u8> = input.lengths.iter().map(|&l| l.max(1)).collect();
    let all: Vec<Vec<bool>> = lengths.iter().map(|&l| vec![true; l as usize]).collect();
    let universe = to_set(&lengths, &all);
    let lhs = to_set(&lengths, &input.lhs);
    let rhs = to_set(&lengths, &input.rhs);
    let op = match input.op % 3 {
        0 => SetOp::Union,
        1 => SetOp::Intersection,
        _ => SetOp::Difference,
    };

    let ranges = range_set_op(op, &lhs, &rhs);
    let masks = mask_set_op(
        op,
        &range_set_rasterize(&lhs, &universe),
        &range_set_rasterize(&rhs, &universe),
    );
    assert_eq!(mask_set_vectorize(&masks), ranges);
});
