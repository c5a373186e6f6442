use crate::*;
use helix_syntax::{tree::*, *};
use helix_utils::prelude::*;
use pretty_assertions::assert_eq;

fn ptr() -> Type {
    Type::pointer(Type::Word)
}

fn lower(functions: Vec<FunctionDecl>) -> Program {
    Lowerer::new(Module { structs: vec![], functions }).run().unwrap()
}

fn flow(program: &Program) -> crate::Result<FlowOut> {
    FlowChecker::new(program).run()
}

/// The last occurrence of variable `name` in the program.
fn last_use(program: &Program, name: &str) -> ExprId {
    (program.exprs.iter())
        .filter(|(_, e)| matches!(&e.kind, ExprKind::Var(x) if x == name))
        .map(|(id, _)| id)
        .last()
        .unwrap()
}

#[test]
fn copies_are_mutually_outliving() {
    let body = Term::block(vec![
        Term::var_decl("a", Term::var("b", ptr())),
        Term::var("a", ptr()),
        Term::void(),
    ]);
    let program = lower(vec![FunctionDecl::new("main", vec![("b", ptr())], Type::Void, body)]);
    let out = flow(&program).unwrap();
    let a = out.bounds[&last_use(&program, "a")].rvalue;
    let b = out.bounds[&last_use(&program, "b")].rvalue;
    assert!(out.graph.does_outlive(a, b));
    assert!(out.graph.does_outlive(b, a));
    assert!(out.graph.lifetimes[&b].is_root());
}

#[test]
fn storing_an_inner_pointer_outside_is_rejected() {
    let body = Term::block(vec![
        Term::var_decl("out", Term::alloc(Type::Word)),
        Term::region(
            Some("r"),
            Term::block(vec![
                Term::var_decl("x", Term::alloc(Type::Word)),
                Term::assign(Term::var("out", ptr()), Term::var("x", ptr())).at_line(4),
            ]),
        ),
    ]);
    let program = lower(vec![FunctionDecl::new("main", vec![], Type::Void, body)]);
    let err = flow(&program).unwrap_err();
    assert_eq!(err, FlowError::UnsafeMemoryStore { span: Span::line(4) });
}

#[test]
fn storing_an_outer_pointer_inside_is_accepted() {
    let body = Term::block(vec![
        Term::var_decl("out", Term::alloc(Type::Word)),
        Term::region(
            None,
            Term::block(vec![
                Term::var_decl("x", Term::alloc(Type::Word)),
                Term::assign(Term::var("x", ptr()), Term::var("out", ptr())),
            ]),
        ),
    ]);
    let program = lower(vec![FunctionDecl::new("main", vec![], Type::Void, body)]);
    let out = flow(&program).unwrap();
    assert_eq!(out.regions.len(), 1);
}

#[test]
fn storing_through_a_parameter_requires_an_outliving_value() {
    let store = |value: Term| {
        Term::block(vec![Term::region(
            None,
            Term::block(vec![
                Term::var_decl("x", Term::alloc(Type::Word)),
                Term::assign(Term::deref(Term::var("p", Type::pointer(ptr()))), value),
            ]),
        )])
    };
    let params = || vec![("p", Type::pointer(ptr()))];
    let rejected = lower(vec![FunctionDecl::new(
        "main",
        params(),
        Type::Void,
        store(Term::var("x", ptr())),
    )]);
    assert!(matches!(flow(&rejected), Err(FlowError::UnsafeMemoryStore { .. })));
    let accepted = lower(vec![FunctionDecl::new(
        "main",
        params(),
        Type::Void,
        store(Term::alloc(Type::Word)),
    )]);
    assert!(flow(&accepted).is_ok());
}

fn branchy(hoisted: bool) -> Vec<FunctionDecl> {
    let arm = |region: &str, var: &str| {
        let value = if hoisted {
            Term::var("p", ptr())
        } else {
            Term::block(vec![Term::var_decl(var, Term::alloc(Type::Word)), Term::var(var, ptr())])
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
    vec![FunctionDecl::new("main", vec![("c", Type::Bool)], ptr(), Term::block(stmts))]
}

#[test]
fn disagreeing_branches_merge_at_run_time() {
    let program = lower(branchy(false));
    let out = flow(&program).unwrap();
    assert_eq!(out.runtime_roots.len(), 1);
    let (_, root) = out.runtime_roots.iter().next().unwrap();
    assert_eq!(root.kind, RuntimeRootKind::Merge);
    let names: Vec<_> = (root.candidates.iter()).map(|c| out.region_name(c).unwrap()).collect();
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n.starts_with("$a") || n.starts_with("$b")));
    // each allocation depends on the merge, which its branch cannot see
    for (_, alloc) in out.allocations.iter() {
        let roots = out.graph.get_maximum_roots(alloc.lifetime);
        assert_eq!(roots, vec![root.lifetime]);
        assert!(!alloc.allowed.contains(&root.lifetime));
    }
}

#[test]
fn agreeing_branches_stay_aliases() {
    let program = lower(branchy(true));
    let out = flow(&program).unwrap();
    assert!(out.runtime_roots.is_empty());
    let (_, alloc) = out.allocations.iter().next().unwrap();
    assert_eq!(out.graph.get_maximum_roots(alloc.lifetime), vec![LifetimeId::HEAP]);
}

#[test]
fn reassignment_in_one_branch_merges_the_variable() {
    let body = Term::block(vec![
        Term::var_decl("p", Term::alloc(Type::Word)),
        Term::if_then(
            Term::var("c", Type::Bool),
            Term::assign(Term::var("p", ptr()), Term::alloc(Type::Word)),
        ),
        Term::ret(Some(Term::var("p", ptr()))),
    ]);
    let program = lower(vec![FunctionDecl::new("main", vec![("c", Type::Bool)], ptr(), body)]);
    let out = flow(&program).unwrap();
    let (_, root) = out.runtime_roots.iter().next().unwrap();
    assert_eq!(root.candidates, vec![LifetimeId::HEAP]);
    let p = out.bounds[&last_use(&program, "p")].rvalue;
    assert_eq!(p, root.lifetime);
}

#[test]
fn loops_bind_a_root_per_reassigned_variable() {
    let body = Term::block(vec![
        Term::var_decl("v", Term::alloc(Type::Word)),
        Term::var_decl("n", Term::word(0)),
        Term::loop_(Term::block(vec![
            Term::assign(Term::var("v", ptr()), Term::alloc(Type::Word)),
            Term::assign(Term::var("n", Type::Word), Term::word(1)),
            Term::break_(),
        ])),
        Term::ret(Some(Term::var("v", ptr()))),
    ]);
    let program = lower(vec![FunctionDecl::new("main", vec![], ptr(), body)]);
    let out = flow(&program).unwrap();
    assert_eq!(out.runtime_roots.len(), 1);
    let (_, root) = out.runtime_roots.iter().next().unwrap();
    assert_eq!(root.kind, RuntimeRootKind::Loop);
    assert_eq!(root.candidates, vec![LifetimeId::HEAP]);
    let v = out.bounds[&last_use(&program, "v")].rvalue;
    assert!(out.graph.does_outlive(v, LifetimeId::HEAP));
}

#[test]
fn async_blocks_hang_off_the_heap() {
    let body = Term::block(vec![
        Term::var_decl("p", Term::alloc(Type::Word)),
        Term::region(
            None,
            Term::async_(Term::block(vec![
                Term::var_decl("q", Term::var("p", ptr())),
                Term::var_decl("fresh", Term::alloc(Type::Word)),
            ])),
        ),
    ]);
    let program = lower(vec![FunctionDecl::new("main", vec![], Type::Void, body)]);
    let out = flow(&program).unwrap();
    let (_, task) = out.asyncs.iter().next().unwrap();
    assert_eq!(task.heap, LifetimeId::HEAP);
    assert_eq!(task.captures, vec![("p".to_string(), ptr())]);
    assert!(out.graph.does_outlive(LifetimeId::HEAP, task.root));
    let (_, region) = out.regions.iter().next().unwrap();
    let fresh = (out.allocations.iter())
        .map(|(_, alloc)| alloc)
        .find(|alloc| alloc.allowed.contains(&task.root))
        .unwrap();
    assert!(!fresh.allowed.contains(&region.root));
}

#[test]
fn from_pins_allocations() {
    let body = Term::region(
        Some("r"),
        Term::from_region("r", Term::block(vec![Term::var_decl("x", Term::alloc(Type::Word))])),
    );
    let program = lower(vec![FunctionDecl::new("main", vec![], Type::Void, body)]);
    let out = flow(&program).unwrap();
    let (_, alloc) = out.allocations.iter().next().unwrap();
    let (_, region) = out.regions.iter().next().unwrap();
    assert!(out.graph.get_equivalent_lifetimes(alloc.lifetime).contains(&region.root));
}

#[test]
fn unknown_names_are_reported() {
    let body = Term::from_region("nowhere", Term::void()).at_line(2);
    let program = lower(vec![FunctionDecl::new("main", vec![], Type::Void, body)]);
    assert_eq!(
        flow(&program).unwrap_err(),
        FlowError::UnboundRegion { name: "nowhere".into(), span: Span::line(2) }
    );
    let body = Term::var("ghost", ptr());
    let program = lower(vec![FunctionDecl::new("main", vec![], Type::Void, body)]);
    assert!(matches!(flow(&program), Err(FlowError::UnboundVariable { .. })));
}

#[test]
fn break_needs_a_loop() {
    let program = lower(vec![FunctionDecl::new("main", vec![], Type::Void, Term::break_())]);
    assert!(matches!(flow(&program), Err(FlowError::BreakOutsideLoop { .. })));
}

#[test]
fn value_functions_return_on_every_path() {
    let cond = || Term::var("c", Type::Bool);
    let ret = || Term::ret(Some(Term::alloc(Type::Word)));
    let partial = Term::block(vec![Term::if_then(cond(), ret())]);
    let program = lower(vec![FunctionDecl::new("f", vec![("c", Type::Bool)], ptr(), partial)]);
    assert_eq!(flow(&program).unwrap_err(), FlowError::MissingReturn { function: "f".into() });

    let total = Term::block(vec![Term::if_else(cond(), ret(), ret())]);
    let program = lower(vec![FunctionDecl::new("f", vec![("c", Type::Bool)], ptr(), total)]);
    let out = flow(&program).unwrap();
    let f = program.function_named("f").unwrap();
    assert!(out.cfgs[&f].always_returns(&CfgNode::Start));

    let trailing = Term::block(vec![Term::alloc(Type::Word)]);
    let program = lower(vec![FunctionDecl::new("f", vec![], ptr(), trailing)]);
    assert!(flow(&program).is_ok());
}

#[test]
fn struct_members_follow_their_parent() {
    let node = StructDecl {
        name: "Node".into(),
        fields: vec![
            FieldDecl { name: "value".into(), ty: Type::Word },
            FieldDecl { name: "next".into(), ty: ptr() },
        ],
    };
    let node_ty = Type::Struct("Node".into());
    let body = Term::block(vec![
        Term::var_decl("p", Term::alloc(Type::Word)),
        Term::var_decl(
            "n",
            Term::struct_lit(
                "Node",
                vec![("value", Term::word(1)), ("next", Term::var("p", ptr()))],
            ),
        ),
        Term::member(Term::var("n", node_ty), "next", ptr()),
    ]);
    let module = Module {
        structs: vec![node],
        functions: vec![FunctionDecl::new("main", vec![], ptr(), body)],
    };
    let program = Lowerer::new(module).run().unwrap();
    let out = flow(&program).unwrap();
    let member = (program.exprs.iter())
        .find(|(_, e)| matches!(e.kind, ExprKind::Member(..)))
        .map(|(id, _)| id)
        .unwrap();
    let next = out.bounds[&member].rvalue;
    let p = out.bounds[&last_use(&program, "p")].rvalue;
    assert!(!next.is_none());
    assert!(out.graph.does_outlive(next, p));
    assert!(out.graph.does_outlive(p, next));
}

#[test]
fn tasks_cannot_capture_region_pointers() {
    let task = Term::async_(Term::block(vec![Term::assign(
        Term::deref(Term::var("p", ptr()).at_line(4)),
        Term::word(2),
    )]));
    let body = Term::block(vec![Term::region(
        Some("r"),
        Term::block(vec![Term::var_decl("p", Term::alloc(Type::Word)), task]),
    )]);
    let program = lower(vec![FunctionDecl::new("main", vec![], Type::Void, body)]);
    let err = flow(&program).unwrap_err();
    assert_eq!(err, FlowError::UnsafeMemoryStore { span: Span::line(4) });
}

#[test]
fn heap_captures_outlive_the_task() {
    let task = Term::async_(Term::block(vec![Term::assign(
        Term::deref(Term::var("p", ptr())),
        Term::word(2),
    )]));
    let body = Term::block(vec![Term::var_decl("p", Term::alloc(Type::Word)), task]);
    let program = lower(vec![FunctionDecl::new("main", vec![], Type::Void, body)]);
    let out = flow(&program).unwrap();
    let (_, scope) = out.asyncs.iter().next().unwrap();
    assert_eq!(scope.captures, vec![("p".to_string(), ptr())]);
    let p = out.bounds[&last_use(&program, "p")].rvalue;
    assert!(out.graph.does_outlive(p, scope.root));
    assert!(!out.graph.does_outlive(scope.root, p));
}
