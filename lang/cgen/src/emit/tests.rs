use crate::{syntax::*, *};
use helix_flow::FlowChecker;
use helix_syntax::{tree::*, Lowerer, Type};
use helix_utils::prelude::*;
use pretty_assertions::assert_eq;
use unindent::unindent;

fn ptr() -> Type {
    Type::pointer(Type::Word)
}

fn emit_with(functions: Vec<FunctionDecl>, options: EmitOptions) -> crate::Result<CUnit> {
    let program = Lowerer::new(Module { structs: vec![], functions }).run().unwrap();
    let flow = FlowChecker::new(&program).run().unwrap();
    Emitter::new(&program, &flow).with_options(options).run()
}

fn emit(functions: Vec<FunctionDecl>) -> crate::Result<CUnit> {
    emit_with(functions, EmitOptions::default())
}

fn main_fn(params: Vec<(&str, Type)>, ret: Type, body: Vec<Term>) -> Vec<FunctionDecl> {
    vec![FunctionDecl::new("main", params, ret, Term::block(body))]
}

fn body_of(unit: &CUnit, name: &str) -> String {
    unit.function(name).unwrap().to_string()
}

#[test]
fn region_block_guards_its_lifetime() {
    let body = vec![Term::region(
        Some("r"),
        Term::block(vec![Term::var_decl("x", Term::alloc(Type::Word)).at_line(3)]),
    )
    .at_line(2)];
    let functions = main_fn(vec![], Type::Void, body);
    let program = Lowerer::new(Module { structs: vec![], functions }).run().unwrap();
    let flow = FlowChecker::new(&program).run().unwrap();
    let (_, scope) = flow.regions.iter().next().unwrap();
    let r = scope.name.clone();
    let unit = Emitter::new(&program, &flow).run().unwrap();
    let expected = unindent(&format!(
        "
        void $main(void* env) {{
            Region* heap = (Region*)env;
            // Line 2: region {r}
            Region* {r} = 0U;
            jmp_buf jump_buffer_0;
            if ((0U != setjmp(jump_buffer_0))) {{
                region_delete({r});
                region_panic(heap);
            }}
            {r} = region_create((&jump_buffer_0));
            int64_t* $new1 = (int64_t*)region_alloc({r}, sizeof(int64_t));
            // Line 3: var x
            int64_t* $x = $new1;
            region_delete({r});
        }}
        "
    ));
    assert_eq!(body_of(&unit, "$main"), expected.trim_end());
}

#[test]
fn unbound_allocations_live_on_the_stack() {
    let unit = emit(main_fn(vec![], Type::Void, vec![Term::alloc(Type::Word)])).unwrap();
    let main = body_of(&unit, "$main");
    assert!(main.contains("int64_t $stack1;"));
    assert!(main.contains("int64_t* $new0 = (&$stack1);"));
    assert!(!main.contains("region_alloc"));
}

fn branchy(hoisted: bool) -> Vec<FunctionDecl> {
    let arm = |region: &str, var: &str| {
        let value = if hoisted {
            Term::var("p", ptr())
        } else {
            Term::block(vec![
                Term::var_decl(var, Term::alloc(Type::Word).at_line(5)),
                Term::var(var, ptr()),
            ])
        };
        Term::region(Some(region), value)
    };
    let mut stmts = vec![];
    if hoisted {
        stmts.push(Term::var_decl("p", Term::alloc(Type::Word)));
    }
    stmts.push(Term::var_decl(
        "r",
        Term::if_else(Term::var("c", Type::Bool), arm("a", "x"), arm("b", "y")),
    ));
    stmts.push(Term::ret(Some(Term::var("r", ptr()))));
    main_fn(vec![("c", Type::Bool)], ptr(), stmts)
}

#[test]
fn allocation_escaping_its_branch_region_fails() {
    let err = emit(branchy(false)).unwrap_err();
    assert_eq!(err, CodegenError::LifetimeInferenceFailed { span: Span::line(5) });
    assert!(err.to_string().starts_with("5:"));
    assert!(err.to_string().contains("Lifetime Inference Failed"));
}

#[test]
fn hoisted_allocation_goes_to_the_heap() {
    let unit = emit(branchy(true)).unwrap();
    let main = body_of(&unit, "$main");
    assert!(main.starts_with("int64_t* $main(void* env, _Bool $c) {"));
    assert!(main.contains("(int64_t*)region_alloc(heap, sizeof(int64_t));"));
    assert!(main.contains("int64_t* $if_temp"));
    assert!(main.contains("return $r;"));
    // both branch regions are opened and torn down
    assert_eq!(main.matches("region_create").count(), 2);
    assert_eq!(main.matches("region_delete").count(), 4);
}

#[test]
fn unrelated_roots_pick_a_region_at_run_time() {
    let body = vec![
        Term::var_decl("x", Term::alloc(Type::Word).at_line(2)),
        Term::var_decl(
            "m",
            Term::if_else(Term::var("c", Type::Bool), Term::var("p", ptr()), Term::var("x", ptr())),
        ),
        Term::var_decl(
            "n",
            Term::if_else(Term::var("c", Type::Bool), Term::var("q", ptr()), Term::var("x", ptr())),
        ),
    ];
    let params = vec![("c", Type::Bool), ("p", ptr()), ("q", ptr())];
    let unit = emit(main_fn(params, Type::Void, body)).unwrap();
    let main = body_of(&unit, "$main");
    assert!(main.contains("// Line 2: region calculation"));
    assert!(main.contains("Region* $region_min_0 = region_min(heap, heap);"));
    assert!(main.contains(
        "int64_t* $new1 = (int64_t*)region_alloc($region_min_0, sizeof(int64_t));"
    ));
    // each merge is bound right after its if
    assert_eq!(main.matches("Region* $merge_region").count(), 2);
}

/// The `Region* <prefix>...` variable initialized with `init` in `body`.
fn region_bound_to(body: &str, prefix: &str, init: &str) -> String {
    let decl = format!("Region* {prefix}");
    let line = (body.lines().map(str::trim_start))
        .find(|line| line.starts_with(&decl) && line.ends_with(&format!(" = {init};")))
        .unwrap_or_else(|| panic!("no {} bound to `{}` in\n{}", prefix, init, body));
    line["Region* ".len()..].split(' ').next().unwrap().to_string()
}

#[test]
fn distinct_regions_are_folded_at_run_time() {
    let body = vec![
        Term::var_decl(
            "m",
            Term::if_else(Term::var("c", Type::Bool), Term::var("p", ptr()), Term::var("q", ptr())),
        ),
        Term::var_decl("x", Term::alloc(Type::Word).at_line(3)),
        Term::var_decl(
            "a",
            Term::if_else(Term::var("c", Type::Bool), Term::var("m", ptr()), Term::var("x", ptr())),
        ),
        Term::var_decl(
            "b",
            Term::if_else(Term::var("c", Type::Bool), Term::var("s", ptr()), Term::var("x", ptr())),
        ),
    ];
    let params = vec![("c", Type::Bool), ("p", ptr()), ("q", ptr()), ("s", ptr())];
    let unit = emit(main_fn(params, Type::Void, body)).unwrap();
    let main = body_of(&unit, "$main");
    // `m` is one of two parameters; `s` is unrelated to either
    let merge = region_bound_to(&main, "$merge_region", "region_min(heap, heap)");
    let picked = region_bound_to(&main, "$region_min_", &format!("region_min({merge}, heap)"));
    assert!(main.contains("// Line 3: region calculation"));
    assert!(main.contains(&format!("(int64_t*)region_alloc({picked}, sizeof(int64_t));")));
    // the pick happens after `m` is bound and before `x` is declared
    let bound = main.find(&format!("Region* {merge} = ")).unwrap();
    let folded = main.find(&format!("Region* {picked} = ")).unwrap();
    let declared = main.find("int64_t* $x = ").unwrap();
    assert!(bound < folded && folded < declared);
}

#[test]
fn loop_roots_are_bound_before_the_loop() {
    let body = vec![
        Term::var_decl("p", Term::alloc(Type::Word)),
        Term::loop_(Term::block(vec![
            Term::assign(Term::var("p", ptr()), Term::alloc(Type::Word)),
            Term::break_(),
        ])),
    ];
    let unit = emit(main_fn(vec![], Type::Void, body)).unwrap();
    let main = body_of(&unit, "$main");
    assert_eq!(main.matches("region_alloc(heap, sizeof(int64_t))").count(), 2);
    let bound = main.find("Region* $loop_region").unwrap();
    let head = main.find("while (1) {").unwrap();
    assert!(bound < head);
    assert!(main.contains("= heap;"));
    assert!(main.contains("        break;"));
}

#[test]
fn return_tears_down_open_regions() {
    let body = vec![Term::region(Some("r"), Term::block(vec![Term::ret(Some(Term::word(1)))]))];
    let unit = emit(main_fn(vec![], Type::Word, body)).unwrap();
    let main = body_of(&unit, "$main");
    let region = main.lines().find_map(|l| l.trim().strip_prefix("Region* $r")).unwrap();
    let r = format!("$r{}", region.trim_end_matches(" = 0U;"));
    let expected = format!(
        "    int64_t $ret_temp1 = 1;\n    region_delete({r});\n    return $ret_temp1;\n"
    );
    assert!(main.contains(&expected), "{}", main);
}

#[test]
fn async_closes_over_its_free_regions() {
    let body = vec![
        Term::var_decl("x", Term::alloc(Type::Word)),
        Term::async_(Term::block(vec![
            Term::var_decl("y", Term::var("x", ptr())),
            Term::var_decl("z", Term::alloc(Type::Word)),
        ])),
    ];
    let unit = emit(main_fn(vec![], Type::Void, body)).unwrap();
    assert_eq!(unit.lambdas.len(), 1);
    let lambda = &unit.lambdas[0];
    assert!(lambda.is_static);
    assert!(lambda.name.starts_with("$main$async"));
    assert_eq!(lambda.params, vec![(CType::void_ptr(), "environment".to_string())]);

    let env = unit.structs.iter().find(|s| s.name.starts_with("$async_env")).unwrap();
    let fields: Vec<_> = env.fields.iter().map(|(_, name)| name.as_str()).collect();
    assert_eq!(fields, vec!["$x", "heap"]);

    let text = lambda.to_string();
    assert!(text.contains("Region* heap = ((*environment_temp).heap);"));
    assert!(text.contains("int64_t* $x = ((*environment_temp).$x);"));
    assert!(text.contains("if ((0U != setjmp(async_jump_buffer_"));
    assert!(text.contains("region_alloc($async_region"));

    let main = body_of(&unit, "$main");
    assert!(main.contains(&format!("region_async(heap, (&{}), $closure_env", lambda.name)));
    let alloc = format!("(struct {}*)region_alloc(heap, sizeof(struct {}))", env.name, env.name);
    assert!(main.contains(&alloc));
}

#[test]
fn calls_pass_the_heap_first() {
    let functions = vec![
        FunctionDecl::new("id", vec![("n", Type::Word)], Type::Word, Term::var("n", Type::Word)),
        FunctionDecl::new(
            "main",
            vec![],
            Type::Void,
            Term::block(vec![Term::var_decl(
                "k",
                Term::invoke("id", vec![Term::word(3)], Type::Word),
            )]),
        ),
    ];
    let unit = emit(functions).unwrap();
    let id = body_of(&unit, "$id");
    assert!(id.starts_with("int64_t $id(void* env, int64_t $n) {"));
    assert!(id.contains("return $n;"));
    let main = body_of(&unit, "$main");
    assert!(main.contains("int64_t $call0 = $id(heap, 3);"));
    assert!(main.contains("int64_t $k = $call0;"));
}

#[test]
fn unit_starts_with_the_runtime() {
    let unit = emit(main_fn(vec![], Type::Void, vec![])).unwrap();
    let text = unit.render().unwrap();
    assert!(text.starts_with("#include \"helix_runtime.h\"\n#include <stddef.h>\n"));
    assert!(text.contains("Region* region_create(jmp_buf*);"));
    assert!(text.contains("Region* region_min(Region*, Region*);"));
    assert!(text.contains("void $main(void* env);"));

    let options =
        EmitOptions { runtime_header: "rt.h".to_string(), line_comments: false, prelude: false };
    let body = vec![Term::var_decl("x", Term::alloc(Type::Word)).at_line(1)];
    let text = emit_with(main_fn(vec![], Type::Void, body), options).unwrap().render().unwrap();
    assert!(text.starts_with("#include \"rt.h\"\n\nvoid $main(void* env);"));
    assert!(!text.contains("// Line"));
}
