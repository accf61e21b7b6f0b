#![no_main]

use libfuzzer_sys::fuzz_target;
use rangeq::catalog::TagCatalog;
use rangeq::set::mask_set_vectorize;

fuzz_target!(|data: &str| {
    // Loading must reject bad grids with an error, never a panic
    if let Ok(catalog) = TagCatalog::from_grid(data) {
        for (ranges, masks) in catalog.range_sets().iter().zip(catalog.mask_sets()) {
            assert_eq!(&mask_set_vectorize(masks), ranges);
        }
    }
});
