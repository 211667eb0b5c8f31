use super::*;
use log::debug;

impl Interpreter {
    /// Register an object with the heap, reusing a freed slot when one exists.
    pub(crate) fn allocate_object_slot(&mut self, obj: ObjRef) -> u64 {
        self.gc_alloc_count += 1;
        let id = if let Some(idx) = self.free_list.pop() {
            self.objects[idx] = Some(obj.clone());
            idx as u64
        } else {
            let idx = self.objects.len();
            self.objects.push(Some(obj.clone()));
            idx as u64
        };
        obj.borrow_mut().id = Some(id);
        id
    }

    /// Mark-and-sweep over the heap. Runs only between top-level statements,
    /// where no evaluator temporaries are live; anything the host still holds
    /// must be passed as an extra root.
    pub(crate) fn maybe_gc(&mut self, extra_roots: &[&JsValue]) {
        if self.gc_alloc_count < GC_THRESHOLD {
            return;
        }
        self.gc_alloc_count = 0;
        let obj_count = self.objects.len();
        let mut marks = vec![false; obj_count];

        let mut worklist: Vec<u64> = Vec::new();
        if let Some(id) = self.global.borrow().id {
            worklist.push(id);
        }
        collect_scope_roots(&self.scopes, &mut worklist);
        for proto in [
            Some(&self.object_prototype),
            Some(&self.function_prototype),
            self.boolean_prototype.as_ref(),
            self.number_prototype.as_ref(),
        ]
        .into_iter()
        .flatten()
        {
            if let Some(id) = proto.borrow().id {
                worklist.push(id);
            }
        }
        for root in extra_roots {
            collect_value_roots(root, &mut worklist);
        }

        // Mark phase (BFS)
        while let Some(id) = worklist.pop() {
            let idx = id as usize;
            if idx >= obj_count || marks[idx] {
                continue;
            }
            marks[idx] = true;
            let obj_rc = match &self.objects[idx] {
                Some(rc) => rc.clone(),
                None => continue,
            };
            let obj = obj_rc.borrow();

            if let Some(proto) = &obj.prototype
                && let Some(pid) = proto.borrow().id
            {
                worklist.push(pid);
            }
            for property in obj.properties.values() {
                collect_value_roots(&property.value, &mut worklist);
            }
            if let Some(internal) = &obj.internal_value {
                collect_value_roots(internal, &mut worklist);
            }
            // A closure keeps its defining scope chain alive
            if let Some(JsFunction::User(user)) = &obj.call {
                collect_scope_roots(&user.scope, &mut worklist);
            }
        }

        // Sweep phase
        let mut swept = 0usize;
        for i in 0..obj_count {
            if !marks[i] && self.objects[i].is_some() {
                self.objects[i] = None;
                self.free_list.push(i);
                swept += 1;
            }
        }
        debug!("gc: swept {swept} of {obj_count} objects");
    }
}

fn collect_value_roots(val: &JsValue, worklist: &mut Vec<u64>) {
    if let JsValue::Object(o) = val {
        worklist.push(o.id);
    }
}

fn collect_scope_roots(scope: &ScopeRef, worklist: &mut Vec<u64>) {
    let mut current = Some(scope.clone());
    while let Some(s) = current {
        if let Some(id) = s.activation.borrow().id {
            worklist.push(id);
        }
        current = s.prev.clone();
    }
}
