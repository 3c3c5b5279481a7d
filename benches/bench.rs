#![feature(test)]

// 'test' is a special crate that requires introduction this way even though we
// are using rust 2018.
// https://doc.rust-lang.org/nightly/edition-guide/rust-2018/module-system/path-clarity.html
extern crate test;
use left_right_map::{create, Operation};
use more_asserts::*;

struct AddOne;
impl Operation<i32> for AddOne {
    type Output = ();
    fn apply(&self, table: &mut i32) {
        *table += 1;
    }
}

// Test the speed of writing (and refreshing) when there is no reader
// contention to wait out.
#[bench]
fn write_and_refresh_without_contention(b: &mut test::bench::Bencher) {
    let (_factory, mut writer) = create(|| 1);
    b.iter(|| {
        writer.write(AddOne);
        writer.refresh();
    });
}

// Test the speed of writing (and refreshing) when many readers are
// continually reading, so refresh has to drain stragglers.
#[bench]
fn write_and_refresh_with_read_contention(b: &mut test::bench::Bencher) {
    let (factory, mut writer) = create(|| 1);
    let _reader_handles: Vec<_> = (0..4)
        .map(|_| {
            let reader = factory.create_reader();
            std::thread::spawn(move || {
                // Continually perform reads. No point holding one for long;
                // that would just slow down the benchmark.
                while reader.perform_read(|n| *n) != 0 {}
            })
        })
        .collect();

    b.iter(|| {
        writer.write(AddOne);
        writer.refresh();
    });
}

// Test the speed of a read when there is no writer activity and no other
// readers.
#[bench]
fn read_no_contention(b: &mut test::bench::Bencher) {
    let (factory, _writer) = create(|| 1);
    let reader = factory.create_reader();

    b.iter(|| {
        assert_eq!(reader.perform_read(|n| *n), 1);
    });
}

// Test the speed of a read when there is no writer activity, but many other
// readers reading concurrently.
#[bench]
fn read_with_read_contention(b: &mut test::bench::Bencher) {
    let (factory, _writer) = create(|| 1);
    let _reader_handles: Vec<_> = (0..20)
        .map(|_| {
            let reader = factory.create_reader();
            std::thread::spawn(move || {
                while reader.perform_read(|n| *n) != 0 {
                    std::thread::sleep(std::time::Duration::from_millis(10));
                }
            })
        })
        .collect();

    let reader = factory.create_reader();
    b.iter(|| {
        assert_eq!(reader.perform_read(|n| *n), 1);
    });
}

// Test the speed of a read while a Writer is continually writing and
// refreshing in the background.
#[bench]
fn read_with_write_contention(b: &mut test::bench::Bencher) {
    let (factory, mut writer) = create(|| 1);
    let reader = factory.create_reader();
    let _writer_handle = std::thread::spawn(move || loop {
        writer.write(AddOne);
        writer.refresh();
    });

    b.iter(|| {
        assert_gt!(reader.perform_read(|n| *n), 0);
    });
}

// Test the speed of a read with both writer and reader contention.
#[bench]
fn read_with_readwrite_contention(b: &mut test::bench::Bencher) {
    let (factory, mut writer) = create(|| 1);
    let reader = factory.create_reader();
    let _reader_handles: Vec<_> = (0..20)
        .map(|_| {
            let reader = factory.create_reader();
            std::thread::spawn(move || {
                while reader.perform_read(|n| *n) != 0 {
                    std::thread::sleep(std::time::Duration::from_millis(10));
                }
            })
        })
        .collect();
    let _writer_handle = std::thread::spawn(move || loop {
        writer.write(AddOne);
        writer.refresh();
    });

    b.iter(|| {
        assert_gt!(reader.perform_read(|n| *n), 0);
    });
}
