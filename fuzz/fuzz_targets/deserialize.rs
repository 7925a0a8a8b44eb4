#![no_main]

use libfuzzer_sys::fuzz_target;
use roaring_core::io::StreamSource;
use roaring_core::{Bitmap, BitmapView, Portable};

fn check_bitmap(input: &[u8]) {
    let Ok(mut bitmap) = Bitmap::try_deserialize::<Portable>(input) else {
        return;
    };
    bitmap.internal_validate().unwrap();

    let streamed = Bitmap::deserialize_from::<Portable>(StreamSource::new(input)).unwrap();
    assert_eq!(bitmap, streamed, "Stream decoding doesn't match slice decoding");

    // Views follow the offset table, which sequential decoding never reads
    if let Ok(view) = BitmapView::deserialize::<Portable>(input) {
        assert_eq!(view.cardinality(), bitmap.cardinality());
        if let Ok(viewed) = view.to_bitmap() {
            viewed.internal_validate().unwrap();
        }
    }

    let reencoded = bitmap.serialize::<Portable>();
    assert_eq!(
        Bitmap::try_deserialize::<Portable>(&reencoded).unwrap(),
        bitmap
    );

    let start_cardinality = bitmap.cardinality();
    let mut new_cardinality = start_cardinality;
    for i in 100..1000 {
        if !bitmap.contains(i) {
            bitmap.add(i);
            new_cardinality += 1;
        }
    }
    assert_eq!(new_cardinality, bitmap.cardinality(), "Cardinality mismatch");
}

fuzz_target!(|input: &[u8]| {
    check_bitmap(input);
});
