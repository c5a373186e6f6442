//! Declarations of the region runtime the generated C links against.

/// Headers every unit needs besides the runtime header itself.
pub const SYSTEM_HEADERS: &[&str] = &["<stddef.h>", "<stdint.h>", "<setjmp.h>"];

pub const REGION_CREATE: &str = "region_create";
pub const REGION_DELETE: &str = "region_delete";
pub const REGION_ALLOC: &str = "region_alloc";
pub const REGION_ASYNC: &str = "region_async";
pub const REGION_PANIC: &str = "region_panic";
/// Not part of the fixed ABI; picks the more recently created region.
pub const REGION_MIN: &str = "region_min";

pub fn prelude() -> Vec<String> {
    [
        "typedef struct Region Region;",
        "typedef void (*fn_ptr)(void*);",
        "Region* region_create(jmp_buf*);",
        "void    region_delete(Region*);",
        "void*   region_alloc(Region*, size_t);",
        "void    region_async(Region*, fn_ptr, void* env);",
        "void    region_panic(Region*);",
        "Region* region_min(Region*, Region*);",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}
