// Semantic Translator: invoked per reduction with the reduced production
// and its attribute-bearing children, in original right-hand-side order.
// Mutates the symbol tables and quadruple stream; returns the synthesized
// attribute for the reduced non-terminal. Errors are collected rather than
// propagated, so the user sees every one of them in a single pass.

use crate::attributes::Attribute;
use crate::error::SemanticError;
use crate::grammar::Grammar;
use crate::location::Location;
use crate::production::Production;
use crate::quad::QuadStream;
use crate::symtab::SymbolTables;

pub struct Translator {
    pub symtab: SymbolTables,
    pub quads: QuadStream,
    pub diagnostics: Vec<SemanticError>,
    /// Depth of `while` nesting currently open, so `break`/`continue` can be
    /// rejected outside a loop. Entered/left by the `W`/`WhileStmt` markers.
    loop_depth: u32,
}

impl Translator {
    pub fn new(start_address: u32) -> Self {
        Self {
            symtab: SymbolTables::new(),
            quads: QuadStream::new(start_address),
            diagnostics: Vec::new(),
            loop_depth: 0,
        }
    }

    fn error(&mut self, error: SemanticError) {
        self.diagnostics.push(error);
    }

    pub fn execute(
        &mut self,
        grammar: &Grammar,
        production: &Production,
        mut children: Vec<Attribute>,
        location: Location,
    ) -> Attribute {
        let lhs_name = grammar.registry.name_of(production.lhs).unwrap_or("?").to_string();
        match lhs_name.as_str() {
            "Program" | "Decl" | "DeclList" | "LoopStmt" | "Stmt" | "Factor" => {
                passthrough(children)
            }

            "BoolExpr" => {
                let expr = passthrough(children);
                let place = expr.place.unwrap_or_else(|| "-".to_string());
                let jnz = self.quads.emit("jnz", place, "-", "-");
                let j = self.quads.emit("j", "-", "-", "-");
                Attribute {
                    truelist: vec![jnz],
                    falselist: vec![j],
                    ..Attribute::default()
                }
            }

            "W" => {
                self.loop_depth += 1;
                Attribute::default()
            }

            "S" => {
                self.quads.emit("j", "-", "-", "-");
                Attribute::default()
            }

            "P" => {
                let start_address = self.quads.len() as u32 + self.quads.start_address;
                self.symtab.push_process(start_address);
                Attribute::default()
            }

            "M" => Attribute {
                quad: Some(self.quads.len()),
                ..Attribute::default()
            },

            "N" => {
                let idx = self.quads.emit("j", "-", "-", "-");
                Attribute {
                    nextlist: vec![idx],
                    ..Attribute::default()
                }
            }

            "VarDeclInner" => {
                let identifier = children.remove(1).identifier;
                Attribute {
                    identifier,
                    ..Attribute::default()
                }
            }

            "Param" => {
                let var_decl = children.remove(0);
                let ty = children.remove(1).place.unwrap_or_else(|| "i32".to_string());
                let name = var_decl.identifier.unwrap_or_default();
                if self.symtab.lookup(&name) != 0 {
                    self.error(SemanticError::DuplicateVariable { name: name.clone(), location });
                }
                let word = self.symtab.create_local(&name, &ty);
                Attribute {
                    word: Some(word),
                    ..Attribute::default()
                }
            }

            "ParamList" => {
                if children.is_empty() {
                    Attribute::default()
                } else {
                    let tail = children.remove(1);
                    let param = children.remove(0);
                    let mut param_list = Vec::new();
                    if let Some(word) = param.word {
                        param_list.push(word);
                    }
                    param_list.extend(tail.param_list);
                    Attribute { param_list, ..Attribute::default() }
                }
            }

            "ParamListTail" => {
                if children.is_empty() {
                    Attribute::default()
                } else {
                    let tail = children.remove(2);
                    let param = children.remove(1);
                    let mut param_list = Vec::new();
                    if let Some(word) = param.word {
                        param_list.push(word);
                    }
                    param_list.extend(tail.param_list);
                    Attribute { param_list, ..Attribute::default() }
                }
            }

            "FunctionHeader" => {
                let func_name = children[1].place.clone().unwrap_or_default();
                let ret_type = if children.len() == 7 {
                    children[6].place.clone().unwrap_or_else(|| "i32".to_string())
                } else {
                    "void".to_string()
                };
                let param_list = children[3].param_list.clone();
                if self.symtab.has_other_function_named(&func_name) {
                    self.error(SemanticError::DuplicateFunction {
                        name: func_name.clone(),
                        location,
                    });
                }
                let process = self.symtab.current_mut();
                process.name = func_name;
                process.return_type = ret_type;
                process.params = param_list;
                Attribute::default()
            }

            "FunctionDecl" => {
                let block = children.remove(2);
                let process_is_void;
                let process_name;
                let start_address;
                {
                    let process = self.symtab.current();
                    process_is_void = process.return_type == "void";
                    process_name = process.name.clone();
                    start_address = process.start_address;
                }
                if process_is_void && !block.has_return {
                    self.quads.emit("ret", "-", "-", "-");
                } else if !process_is_void && !block.has_return {
                    self.error(SemanticError::MissingReturn {
                        name: process_name.clone(),
                        location,
                    });
                }
                if process_name == "main" {
                    self.quads.set_tar(0, start_address.to_string());
                }
                Attribute::default()
            }

            "DeclOnly" => {
                let name = children[1].identifier.clone().unwrap_or_default();
                let ty = if children.len() == 5 {
                    children[3].place.clone().unwrap_or_else(|| "i32".to_string())
                } else {
                    "i32".to_string()
                };
                if self.symtab.lookup(&name) != 0 {
                    self.error(SemanticError::DuplicateVariable { name: name.clone(), location });
                }
                self.symtab.create_local(&name, &ty);
                Attribute::default()
            }

            "DeclAssign" => {
                let name = children[1].identifier.clone().unwrap_or_default();
                let (ty, expr) = if children.len() == 7 {
                    (
                        children[3].place.clone().unwrap_or_else(|| "i32".to_string()),
                        children[5].place.clone().unwrap_or_else(|| "-".to_string()),
                    )
                } else {
                    ("i32".to_string(), children[3].place.clone().unwrap_or_else(|| "-".to_string()))
                };
                if self.symtab.lookup(&name) != 0 {
                    self.error(SemanticError::DuplicateVariable { name: name.clone(), location });
                }
                self.symtab.create_local(&name, &ty);
                self.quads.emit("=", expr, "-", name);
                Attribute::default()
            }

            "AssignStmt" => {
                let name = children[0].identifier.clone().unwrap_or_default();
                let expr = children[2].place.clone().unwrap_or_else(|| "-".to_string());
                if self.symtab.lookup(&name) == 0 {
                    self.error(SemanticError::UndefinedVariable { name: name.clone(), location });
                }
                self.quads.emit("=", expr, "-", name);
                Attribute::default()
            }

            "Lvalue" => Attribute {
                identifier: children[0].identifier.clone(),
                place: children[0].place.clone(),
                ..Attribute::default()
            },

            "ExprStmt" => Attribute::default(),

            "ReturnStmt" => {
                let value = if children.len() == 3 {
                    children[1].place.clone().unwrap_or_else(|| "-".to_string())
                } else {
                    "-".to_string()
                };
                self.quads.emit("ret", "-", "-", value);
                Attribute { has_return: true, ..Attribute::default() }
            }

            "BreakStmt" => {
                if self.loop_depth == 0 {
                    self.error(SemanticError::BreakOutsideLoop { location });
                }
                let idx = self.quads.emit("j", "-", "-", "-");
                Attribute { breaklist: vec![idx], ..Attribute::default() }
            }

            "ContinueStmt" => {
                if self.loop_depth == 0 {
                    self.error(SemanticError::ContinueOutsideLoop { location });
                }
                let idx = self.quads.emit("j", "-", "-", "-");
                Attribute { continuelist: vec![idx], ..Attribute::default() }
            }

            "Expr" | "AddExpr" | "Term" => {
                if children.len() == 1 {
                    passthrough(children)
                } else {
                    let lhs = children.remove(0);
                    let op_attr = children.remove(0);
                    let rhs = children.remove(0);
                    let process = self.symtab.current_mut();
                    let temp = process.fresh_temp();
                    let op = op_attr.op.unwrap_or_default();
                    self.quads.emit(
                        op,
                        lhs.place.unwrap_or_else(|| "-".to_string()),
                        rhs.place.unwrap_or_else(|| "-".to_string()),
                        temp.clone(),
                    );
                    Attribute { place: Some(temp), ..Attribute::default() }
                }
            }

            "Element" => {
                if children.len() == 4 {
                    let fn_name = children[0].place.clone().unwrap_or_default();
                    let arg_list = children[2].arg_list.clone();
                    for arg in &arg_list {
                        self.quads.emit("arg", "-", "-", arg.clone());
                    }
                    let process = self.symtab.current_mut();
                    let result = process.fresh_temp();
                    self.quads.emit("call", fn_name, arg_list.len().to_string(), result.clone());
                    Attribute { place: Some(result), ..Attribute::default() }
                } else if children.len() == 3 {
                    Attribute { place: children[1].place.clone(), ..Attribute::default() }
                } else {
                    Attribute { place: children[0].place.clone(), ..Attribute::default() }
                }
            }

            "ArgList" => {
                if children.is_empty() {
                    Attribute::default()
                } else {
                    let tail = children.remove(1);
                    let expr = children.remove(0);
                    let mut arg_list = Vec::new();
                    if let Some(place) = expr.place {
                        arg_list.push(place);
                    }
                    arg_list.extend(tail.arg_list);
                    Attribute { arg_list, ..Attribute::default() }
                }
            }

            "ArgListTail" => {
                if children.is_empty() {
                    Attribute::default()
                } else {
                    let tail = children.remove(2);
                    let expr = children.remove(1);
                    let mut arg_list = Vec::new();
                    if let Some(place) = expr.place {
                        arg_list.push(place);
                    }
                    arg_list.extend(tail.arg_list);
                    Attribute { arg_list, ..Attribute::default() }
                }
            }

            "CmpOp" | "AddOp" | "MulOp" => Attribute {
                op: children[0].place.clone(),
                ..Attribute::default()
            },

            "Type" => Attribute {
                place: children[0].place.clone(),
                ..Attribute::default()
            },

            "WhileStmt" => {
                let _w = children.remove(1);
                let m1 = children.remove(1);
                let bool_expr = children.remove(1);
                let m2 = children.remove(1);
                let block = children.remove(1);
                self.loop_depth -= 1;
                self.quads.backpatch(&bool_expr.truelist, m2.quad.unwrap_or(0));
                let mut exit_list = block.nextlist.clone();
                exit_list.extend(block.continuelist.iter().copied());
                self.quads.backpatch(&exit_list, m1.quad.unwrap_or(0));
                self.quads.emit("j", "-", "-", self.quads.address_of(m1.quad.unwrap_or(0)).to_string());
                let mut nextlist = bool_expr.falselist;
                nextlist.extend(block.breaklist);
                Attribute {
                    nextlist,
                    has_return: false,
                    ..Attribute::default()
                }
            }

            "IfStmt" => {
                if children.len() == 4 {
                    let bool_expr = children.remove(1);
                    let m = children.remove(1);
                    let block = children.remove(1);
                    self.quads.backpatch(&bool_expr.truelist, m.quad.unwrap_or(0));
                    let mut nextlist = bool_expr.falselist;
                    nextlist.extend(block.nextlist);
                    Attribute {
                        nextlist,
                        has_return: block.has_return,
                        breaklist: block.breaklist,
                        continuelist: block.continuelist,
                        ..Attribute::default()
                    }
                } else {
                    let bool_expr = children.remove(1);
                    let m1 = children.remove(1);
                    let block = children.remove(1);
                    let n = children.remove(1);
                    let m2 = children.remove(1);
                    let else_part = children.remove(1);
                    self.quads.backpatch(&bool_expr.truelist, m1.quad.unwrap_or(0));
                    self.quads.backpatch(&bool_expr.falselist, m2.quad.unwrap_or(0));
                    let mut nextlist = block.nextlist;
                    nextlist.extend(n.nextlist);
                    nextlist.extend(else_part.nextlist);
                    let mut breaklist = block.breaklist;
                    breaklist.extend(else_part.breaklist);
                    let mut continuelist = block.continuelist;
                    continuelist.extend(else_part.continuelist);
                    Attribute {
                        nextlist,
                        has_return: block.has_return && else_part.has_return,
                        breaklist,
                        continuelist,
                        ..Attribute::default()
                    }
                }
            }

            "ElsePart" => children.remove(1),

            "Block" => {
                if children.len() == 3 {
                    children.remove(1)
                } else {
                    Attribute::default()
                }
            }

            "StmtList" => {
                if children.is_empty() {
                    Attribute::default()
                } else {
                    let tail = children.remove(2);
                    let m = children.remove(1);
                    let stmt = children.remove(0);
                    self.quads.backpatch(&stmt.nextlist, m.quad.unwrap_or(0));
                    let mut breaklist = stmt.breaklist;
                    breaklist.extend(tail.breaklist);
                    let mut continuelist = stmt.continuelist;
                    continuelist.extend(tail.continuelist);
                    Attribute {
                        nextlist: tail.nextlist,
                        has_return: stmt.has_return || tail.has_return,
                        breaklist,
                        continuelist,
                        ..Attribute::default()
                    }
                }
            }

            other => {
                log::debug!("no semantic action registered for non-terminal {}", other);
                passthrough(children)
            }
        }
    }
}

fn passthrough(mut children: Vec<Attribute>) -> Attribute {
    if children.is_empty() {
        Attribute::default()
    } else {
        children.remove(0)
    }
}
